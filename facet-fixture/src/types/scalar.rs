/// The scalar kinds the primitive generator knows how to produce.
///
/// Every built-in scalar shape registered by [`crate::ShapeRegistry::new`]
/// maps to exactly one of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ScalarKind {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `char`
    Char,
    /// `String`
    String,
    /// Arbitrary-precision integer
    BigInt,
    /// Arbitrary-precision decimal
    BigDecimal,
    /// Calendar date without time zone
    Date,
    /// Time of day without time zone
    Time,
    /// UTC timestamp
    DateTime,
    /// UUID
    Uuid,
}

impl ScalarKind {
    /// Every scalar kind, in registration order.
    pub const ALL: &'static [ScalarKind] = &[
        ScalarKind::Bool,
        ScalarKind::I8,
        ScalarKind::I16,
        ScalarKind::I32,
        ScalarKind::I64,
        ScalarKind::U8,
        ScalarKind::U16,
        ScalarKind::U32,
        ScalarKind::U64,
        ScalarKind::F32,
        ScalarKind::F64,
        ScalarKind::Char,
        ScalarKind::String,
        ScalarKind::BigInt,
        ScalarKind::BigDecimal,
        ScalarKind::Date,
        ScalarKind::Time,
        ScalarKind::DateTime,
        ScalarKind::Uuid,
    ];

    /// The type identifier this kind is registered under.
    pub const fn type_identifier(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::I8 => "i8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::I64 => "i64",
            ScalarKind::U8 => "u8",
            ScalarKind::U16 => "u16",
            ScalarKind::U32 => "u32",
            ScalarKind::U64 => "u64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
            ScalarKind::Char => "char",
            ScalarKind::String => "String",
            ScalarKind::BigInt => "BigInt",
            ScalarKind::BigDecimal => "BigDecimal",
            ScalarKind::Date => "NaiveDate",
            ScalarKind::Time => "NaiveTime",
            ScalarKind::DateTime => "DateTime",
            ScalarKind::Uuid => "Uuid",
        }
    }

    /// Integer kinds, with their inclusive domain as `i128`.
    pub const fn integer_bounds(self) -> Option<(i128, i128)> {
        match self {
            ScalarKind::I8 => Some((i8::MIN as i128, i8::MAX as i128)),
            ScalarKind::I16 => Some((i16::MIN as i128, i16::MAX as i128)),
            ScalarKind::I32 => Some((i32::MIN as i128, i32::MAX as i128)),
            ScalarKind::I64 => Some((i64::MIN as i128, i64::MAX as i128)),
            ScalarKind::U8 => Some((0, u8::MAX as i128)),
            ScalarKind::U16 => Some((0, u16::MAX as i128)),
            ScalarKind::U32 => Some((0, u32::MAX as i128)),
            ScalarKind::U64 => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }

    /// `f32` or `f64`
    pub const fn is_float(self) -> bool {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }

    /// Kinds that accept a numeric range hint.
    pub const fn is_numeric(self) -> bool {
        self.integer_bounds().is_some()
            || self.is_float()
            || matches!(self, ScalarKind::BigInt | ScalarKind::BigDecimal)
    }
}

impl core::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.type_identifier())
    }
}
