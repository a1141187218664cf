//! The runtime shape model: what a type looks like, as far as
//! manufacturing goes.

mod scalar;
pub use scalar::*;

mod type_ref;
pub use type_ref::*;

mod field;
pub use field::*;

mod constructor;
pub use constructor::*;

mod def;
pub use def::*;

/// Schema of a type, as registered in a [`crate::ShapeRegistry`]
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Shape {
    /// Identifier for the type, without generic parameters. Use-sites refer
    /// to the shape by this name.
    pub type_identifier: String,

    /// Names of the generic parameters, in declaration order. Types inside
    /// [`Shape::def`] refer to them by name.
    pub type_params: Vec<String>,

    /// What the shape is made of
    pub def: Def,

    /// Attributes applied to the whole shape
    pub attributes: Vec<ShapeAttribute>,

    /// Doc lines, for diagnostics
    pub doc: Vec<String>,
}

/// An attribute that can be applied to a shape
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ShapeAttribute {
    /// Every value of this type comes from the registered provider with
    /// this key, wherever the type is used
    Strategy(String),
}

impl Shape {
    /// Returns a builder for a shape named `type_identifier`.
    pub fn builder(type_identifier: impl Into<String>) -> ShapeBuilder {
        ShapeBuilder::new(type_identifier)
    }

    /// A scalar shape for `kind`, named after it.
    pub fn scalar(kind: ScalarKind) -> Self {
        Self::builder(kind.type_identifier())
            .def(Def::Scalar(kind))
            .build()
    }

    /// A non-generic record.
    pub fn record(type_identifier: impl Into<String>, def: StructDef) -> Self {
        Self::builder(type_identifier).def(Def::Struct(def)).build()
    }

    /// An enumeration.
    pub fn enumeration<S: Into<String>>(
        type_identifier: impl Into<String>,
        constants: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::builder(type_identifier)
            .def(Def::Enum(EnumDef::new(constants)))
            .build()
    }

    /// An abstract type: needs a substitute to be manufactured.
    pub fn abstract_type(type_identifier: impl Into<String>) -> Self {
        Self::builder(type_identifier).def(Def::Abstract).build()
    }

    /// See [`ShapeAttribute::Strategy`]
    pub fn strategy_attr(&self) -> Option<&str> {
        self.attributes.iter().find_map(|attr| match attr {
            ShapeAttribute::Strategy(key) => Some(key.as_str()),
        })
    }

    /// The record definition, if this is a record.
    pub fn as_struct(&self) -> Option<&StructDef> {
        match &self.def {
            Def::Struct(def) => Some(def),
            _ => None,
        }
    }
}

impl core::fmt::Display for Shape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.type_identifier)?;
        if let Some((first, rest)) = self.type_params.split_first() {
            write!(f, "<{first}")?;
            for param in rest {
                write!(f, ", {param}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

/// Builder for [`Shape`]
pub struct ShapeBuilder {
    type_identifier: String,
    type_params: Vec<String>,
    def: Option<Def>,
    attributes: Vec<ShapeAttribute>,
    doc: Vec<String>,
}

impl ShapeBuilder {
    /// Creates a new `ShapeBuilder` with no definition yet.
    pub fn new(type_identifier: impl Into<String>) -> Self {
        Self {
            type_identifier: type_identifier.into(),
            type_params: Vec::new(),
            def: None,
            attributes: Vec::new(),
            doc: Vec::new(),
        }
    }

    /// Sets the generic parameter names.
    pub fn type_params<S: Into<String>>(mut self, params: impl IntoIterator<Item = S>) -> Self {
        self.type_params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the definition.
    pub fn def(mut self, def: Def) -> Self {
        self.def = Some(def);
        self
    }

    /// Adds a shape attribute.
    pub fn attribute(mut self, attribute: ShapeAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Adds a doc line.
    pub fn doc(mut self, line: impl Into<String>) -> Self {
        self.doc.push(line.into());
        self
    }

    /// Builds the shape. A builder that never received a definition builds
    /// an abstract shape.
    pub fn build(self) -> Shape {
        Shape {
            type_identifier: self.type_identifier,
            type_params: self.type_params,
            def: self.def.unwrap_or(Def::Abstract),
            attributes: self.attributes,
            doc: self.doc,
        }
    }
}
