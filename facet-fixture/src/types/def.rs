use super::{Constructor, Field, ScalarKind, TypeRef};

/// The semantic definition of a shape: is it a scalar, a record, a
/// container?
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Def {
    /// Scalar, produced by the primitive generator
    ///
    /// e.g. `u32`, `String`, `NaiveDate`
    Scalar(ScalarKind),

    /// Record with fields and construction paths
    Struct(StructDef),

    /// Enumeration of named constants
    Enum(EnumDef),

    /// Abstract type (interface, trait object) with no construction path of
    /// its own; a concrete substitute must be registered
    Abstract,

    /// Ordered list of homogeneous values, variable size
    ///
    /// e.g. `Vec<T>`
    List(ListDef),

    /// Unique set of homogeneous values
    ///
    /// e.g. `HashSet<T>`
    Set(ListDef),

    /// Map with distinct keys
    ///
    /// e.g. `HashMap<K, V>`
    Map(MapDef),

    /// A value that may be absent
    ///
    /// e.g. `Option<T>`
    Option(PointerDef),

    /// Transparent pointer, built as its pointee
    ///
    /// e.g. `Box<T>`, `Arc<T>`
    Pointer(PointerDef),
}

impl Def {
    /// Short name of the definition kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Def::Scalar(_) => "scalar",
            Def::Struct(_) => "struct",
            Def::Enum(_) => "enum",
            Def::Abstract => "abstract type",
            Def::List(_) => "list",
            Def::Set(_) => "set",
            Def::Map(_) => "map",
            Def::Option(_) => "option",
            Def::Pointer(_) => "pointer",
        }
    }

    /// Whether values of this definition hold several entries.
    pub fn is_container(&self) -> bool {
        matches!(self, Def::List(_) | Def::Set(_) | Def::Map(_))
    }
}

/// Fields and construction paths of a record type
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct StructDef {
    /// All fields, in declaration order
    pub fields: Vec<Field>,

    /// Constructors and static factories, in declaration order
    pub constructors: Vec<Constructor>,

    /// Abstract types this record can stand in for
    pub implements: Vec<String>,
}

impl StructDef {
    /// A record without fields or constructors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends several fields.
    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Appends a constructor.
    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Declares that this record implements `abstract_name`.
    pub fn implements(mut self, abstract_name: impl Into<String>) -> Self {
        self.implements.push(abstract_name.into());
        self
    }

    /// Looks up a field by name.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Constants of an enumeration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct EnumDef {
    /// Constant names, in declaration order
    pub constants: Vec<String>,
}

impl EnumDef {
    /// An enumeration with the given constants.
    pub fn new<S: Into<String>>(constants: impl IntoIterator<Item = S>) -> Self {
        Self {
            constants: constants.into_iter().map(Into::into).collect(),
        }
    }
}

/// Element type of a list or set
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ListDef {
    /// Element type, usually one of the owner's type parameters
    pub t: TypeRef,
}

impl ListDef {
    /// A list or set of `t`.
    pub fn new(t: TypeRef) -> Self {
        Self { t }
    }
}

/// Key and value types of a map
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct MapDef {
    /// Key type
    pub k: TypeRef,
    /// Value type
    pub v: TypeRef,
}

impl MapDef {
    /// A map from `k` to `v`.
    pub fn new(k: TypeRef, v: TypeRef) -> Self {
        Self { k, v }
    }
}

/// Inner type of an option or pointer
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct PointerDef {
    /// Pointee type
    pub pointee: TypeRef,
}

impl PointerDef {
    /// A wrapper around `pointee`.
    pub fn new(pointee: TypeRef) -> Self {
        Self { pointee }
    }
}
