use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use num_bigint::BigInt;
use uuid::Uuid;

/// A manufactured value.
///
/// Records keep their fields in declaration order; sets and maps keep their
/// entries in generation order, with distinct elements/keys.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent value: cycle placeholder, excluded or nullable field
    Null,
    /// `bool`
    Bool(bool),
    /// `i8`
    I8(i8),
    /// `i16`
    I16(i16),
    /// `i32`
    I32(i32),
    /// `i64`
    I64(i64),
    /// `u8`
    U8(u8),
    /// `u16`
    U16(u16),
    /// `u32`
    U32(u32),
    /// `u64`
    U64(u64),
    /// `f32`
    F32(f32),
    /// `f64`
    F64(f64),
    /// `char`
    Char(char),
    /// `String`
    String(String),
    /// Arbitrary-precision integer
    BigInt(BigInt),
    /// Arbitrary-precision decimal
    BigDecimal(BigDecimal),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// UTC timestamp
    DateTime(DateTime<Utc>),
    /// UUID
    Uuid(Uuid),
    /// Record instance
    Record {
        /// Type identifier of the record
        type_name: String,
        /// `(field name, value)` in declaration order
        fields: Vec<(String, Value)>,
    },
    /// Enumeration constant
    Enum {
        /// Type identifier of the enumeration
        type_name: String,
        /// Name of the constant
        constant: String,
    },
    /// Ordered list
    List(Vec<Value>),
    /// Set of distinct values
    Set(Vec<Value>),
    /// Map with distinct keys
    Map(Vec<(Value, Value)>),
    /// Array, filled by index
    Array(Vec<Value>),
}

impl Value {
    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type identifier of a record or enum value.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Value::Record { type_name, .. } | Value::Enum { type_name, .. } => Some(type_name),
            _ => None,
        }
    }

    /// A record field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record { fields, .. } => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Record fields, in declaration order.
    pub fn fields(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Record { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// The string, if this is [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Any integer that fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(v.into()),
            Value::I16(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::I64(v) => Some(v),
            Value::U8(v) => Some(v.into()),
            Value::U16(v) => Some(v.into()),
            Value::U32(v) => Some(v.into()),
            Value::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Any float, widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(v) => Some(v.into()),
            Value::F64(v) => Some(v),
            _ => None,
        }
    }

    /// The constant name, if this is an enum value.
    pub fn as_constant(&self) -> Option<&str> {
        match self {
            Value::Enum { constant, .. } => Some(constant),
            _ => None,
        }
    }

    /// Elements of a list, set or array.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Set(items) | Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of a map.
    pub fn as_map(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Number of entries of a container, `None` for anything else.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::List(items) | Value::Set(items) | Value::Array(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Whether a container is empty. `false` for non-containers.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Whether this value is the zero/empty default of its kind: `0`,
    /// `false`, `""`, `'\0'` or `Null`.
    pub fn is_zero_default(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::F32(v) => *v == 0.0,
            Value::F64(v) => *v == 0.0,
            Value::Char(c) => *c == '\0',
            Value::String(s) => s.is_empty(),
            other => other.as_i64() == Some(0),
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fn seq(f: &mut core::fmt::Formatter<'_>, items: &[Value]) -> core::fmt::Result {
            let mut iter = items.iter();
            if let Some(first) = iter.next() {
                write!(f, "{first}")?;
                for item in iter {
                    write!(f, ", {item}")?;
                }
            }
            Ok(())
        }

        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v:?}"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::BigDecimal(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Record { type_name, fields } => {
                write!(f, "{type_name} {{")?;
                let mut iter = fields.iter();
                if let Some((name, value)) = iter.next() {
                    write!(f, " {name}: {value}")?;
                    for (name, value) in iter {
                        write!(f, ", {name}: {value}")?;
                    }
                    write!(f, " ")?;
                }
                write!(f, "}}")
            }
            Value::Enum {
                type_name,
                constant,
            } => write!(f, "{type_name}::{constant}"),
            Value::List(items) | Value::Array(items) => {
                write!(f, "[")?;
                seq(f, items)?;
                write!(f, "]")
            }
            Value::Set(items) => {
                write!(f, "{{")?;
                seq(f, items)?;
                write!(f, "}}")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                let mut iter = entries.iter();
                if let Some((k, v)) = iter.next() {
                    write!(f, "{k}: {v}")?;
                    for (k, v) in iter {
                        write!(f, ", {k}: {v}")?;
                    }
                }
                write!(f, "}}")
            }
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
    BigInt => BigInt,
    BigDecimal => BigDecimal,
    NaiveDate => Date,
    NaiveTime => Time,
    DateTime<Utc> => DateTime,
    Uuid => Uuid,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_nested_values() {
        let value = Value::Record {
            type_name: "Person".into(),
            fields: vec![
                ("name".into(), Value::from("Ada")),
                ("age".into(), Value::from(36_u8)),
                (
                    "tags".into(),
                    Value::List(vec![Value::from('x'), Value::Null]),
                ),
                (
                    "kind".into(),
                    Value::Enum {
                        type_name: "Kind".into(),
                        constant: "Admin".into(),
                    },
                ),
            ],
        };
        insta::assert_snapshot!(
            value,
            @r#"Person { name: "Ada", age: 36, tags: ['x', null], kind: Kind::Admin }"#
        );
    }

    #[test]
    fn zero_defaults() {
        assert!(Value::Null.is_zero_default());
        assert!(Value::I32(0).is_zero_default());
        assert!(Value::U64(0).is_zero_default());
        assert!(Value::from("").is_zero_default());
        assert!(!Value::from("x").is_zero_default());
        assert!(!Value::F64(0.5).is_zero_default());
        assert!(!Value::List(vec![]).is_zero_default());
    }
}
