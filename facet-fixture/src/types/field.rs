use bitflags::bitflags;

use super::TypeRef;

/// Describes a field of a record, or a parameter of a constructor.
///
/// Constructor parameters bind to the record field with the same name when
/// the default invoker runs.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Field {
    /// Field or parameter name
    pub name: String,

    /// Declared type, possibly mentioning the owner's type parameters
    pub ty: TypeRef,

    /// Flags for the field (nullable, excluded, ...)
    pub flags: FieldFlags,

    /// Metadata attached to the field
    pub attributes: Vec<FieldAttribute>,
}

impl Field {
    /// A field with no flags and no attributes.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            flags: FieldFlags::EMPTY,
            attributes: Vec::new(),
        }
    }

    /// Parses `ty` with [`TypeRef::parse`].
    ///
    /// # Panics
    ///
    /// Panics if `ty` does not parse: shape declarations are static and a
    /// typo there is a programming error.
    pub fn parsed(name: impl Into<String>, ty: &str) -> Self {
        match TypeRef::parse(ty) {
            Ok(ty) => Self::new(name, ty),
            Err(e) => panic!("invalid field type: {e}"),
        }
    }

    /// Adds an attribute.
    pub fn attribute(mut self, attribute: FieldAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Adds flags.
    pub fn flags(mut self, flags: FieldFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// See [`FieldFlags::NULLABLE`]
    pub fn is_nullable(&self) -> bool {
        self.flags.contains(FieldFlags::NULLABLE)
    }

    /// See [`FieldFlags::EXCLUDED`]
    pub fn is_excluded(&self) -> bool {
        self.flags.contains(FieldFlags::EXCLUDED)
    }

    /// See [`FieldFlags::READ_ONLY`]
    pub fn is_settable(&self) -> bool {
        !self.flags.contains(FieldFlags::READ_ONLY)
    }
}

bitflags! {
    /// Flags that change how the engine treats a field
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u64 {
        /// An empty set of flags
        const EMPTY = 0;

        /// The field may be left `Null` when its type cannot be resolved.
        const NULLABLE = 1 << 0;

        /// Never populate this field.
        const EXCLUDED = 1 << 1;

        /// Only a constructor can set this field; it is never assigned
        /// after construction.
        const READ_ONLY = 1 << 2;
    }
}

impl Default for FieldFlags {
    #[inline(always)]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl core::fmt::Display for FieldFlags {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }

        let flags = [
            (FieldFlags::NULLABLE, "nullable"),
            (FieldFlags::EXCLUDED, "excluded"),
            (FieldFlags::READ_ONLY, "read-only"),
        ];

        let mut is_first = true;
        for (flag, name) in flags {
            if self.contains(flag) {
                if !is_first {
                    write!(f, ", ")?;
                }
                is_first = false;
                write!(f, "{}", name)?;
            }
        }

        Ok(())
    }
}

/// Metadata attached to a field or parameter, steering value generation.
///
/// Resolution order is fixed: [`FieldAttribute::Value`], then
/// [`FieldAttribute::Strategy`], then the structural hints.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FieldAttribute {
    /// Fixed literal, converted to the field's scalar type
    Value(String),

    /// Key of a registered value provider producing the whole value
    Strategy(String),

    /// Key of a registered value provider producing each element (or each
    /// map value) of a container
    ElementStrategy(String),

    /// Key of a registered value provider producing each map key
    KeyStrategy(String),

    /// Number of entries of a container
    Size(usize),

    /// Inclusive numeric range; either bound may be open
    Range {
        /// Lower bound, in the field type's literal syntax
        min: Option<String>,
        /// Upper bound, in the field type's literal syntax
        max: Option<String>,
    },

    /// Exact length of a string
    Length(usize),

    /// Regular expression generated strings must match
    Pattern(String),
}

impl FieldAttribute {
    /// A literal value.
    pub fn value(literal: impl Into<String>) -> Self {
        FieldAttribute::Value(literal.into())
    }

    /// A registered strategy for the whole value.
    pub fn strategy(key: impl Into<String>) -> Self {
        FieldAttribute::Strategy(key.into())
    }

    /// An inclusive range with both bounds.
    pub fn range(min: impl core::fmt::Display, max: impl core::fmt::Display) -> Self {
        FieldAttribute::Range {
            min: Some(min.to_string()),
            max: Some(max.to_string()),
        }
    }

    /// A regex pattern.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        FieldAttribute::Pattern(pattern.into())
    }
}
