use alloc::sync::Arc;

use super::Field;
use crate::Value;

/// Accessibility tier of a constructor, used to rank candidates.
///
/// Declaration order is ranking order: `Public` ranks highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Visibility {
    /// Reachable from anywhere
    Public,
    /// Reachable from the type and its descendants
    Protected,
    /// Reachable from the declaring package (crate)
    Package,
    /// Reachable only from the type itself
    Private,
}

impl core::fmt::Display for Visibility {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Package => "package",
            Visibility::Private => "private",
        };
        f.write_str(s)
    }
}

/// Whether a construction path is a constructor or a static factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstructorKind {
    /// An ordinary constructor
    Constructor,
    /// A static factory method (e.g. `getInstance`, `from_parts`)
    StaticFactory,
}

/// Attributes on a constructor.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ConstructorAttribute {
    /// Use this constructor ahead of every other candidate
    Preferred,
}

/// Arguments handed to an [`Invoker`], in parameter order.
#[derive(Debug)]
pub struct Arguments {
    /// Name of the record type being built
    pub type_name: String,
    /// `(parameter name, value)` in declaration order
    pub values: Vec<(String, Value)>,
}

impl Arguments {
    /// The argument bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// Runs a constructor or factory over resolved arguments and returns the
/// built value.
pub type Invoker = Arc<dyn Fn(Arguments) -> Value + Send + Sync>;

/// One way to build a record: a constructor or a static factory.
#[derive(Clone)]
#[non_exhaustive]
pub struct Constructor {
    /// Name, for diagnostics (`new`, `with_capacity`, `getInstance`...)
    pub name: String,

    /// Constructor or static factory
    pub kind: ConstructorKind,

    /// Accessibility tier
    pub visibility: Visibility,

    /// Parameters, in declaration order
    pub params: Vec<Field>,

    /// Attributes on the constructor itself
    pub attributes: Vec<ConstructorAttribute>,

    /// Custom invocation. When `None`, each argument is bound to the record
    /// field of the same name.
    pub invoker: Option<Invoker>,
}

impl Constructor {
    /// A constructor named `new`.
    pub fn new(visibility: Visibility) -> Self {
        Self {
            name: "new".to_string(),
            kind: ConstructorKind::Constructor,
            visibility,
            params: Vec::new(),
            attributes: Vec::new(),
            invoker: None,
        }
    }

    /// A public constructor named `new`.
    pub fn public() -> Self {
        Self::new(Visibility::Public)
    }

    /// A static factory method.
    pub fn factory(name: impl Into<String>, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            kind: ConstructorKind::StaticFactory,
            ..Self::new(visibility)
        }
    }

    /// Renames the constructor.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Appends a parameter.
    pub fn param(mut self, param: Field) -> Self {
        self.params.push(param);
        self
    }

    /// Appends several parameters.
    pub fn params(mut self, params: impl IntoIterator<Item = Field>) -> Self {
        self.params.extend(params);
        self
    }

    /// Marks this constructor as preferred.
    pub fn preferred(mut self) -> Self {
        self.attributes.push(ConstructorAttribute::Preferred);
        self
    }

    /// Installs a custom invoker.
    pub fn invoker(mut self, invoker: impl Fn(Arguments) -> Value + Send + Sync + 'static) -> Self {
        self.invoker = Some(Arc::new(invoker));
        self
    }

    /// See [`ConstructorAttribute::Preferred`]
    pub fn is_preferred(&self) -> bool {
        self.attributes.contains(&ConstructorAttribute::Preferred)
    }
}

impl core::fmt::Debug for Constructor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Constructor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("visibility", &self.visibility)
            .field("params", &self.params)
            .field("attributes", &self.attributes)
            .field("invoker", &self.invoker.as_ref().map(|_| ".."))
            .finish()
    }
}

impl core::fmt::Display for Constructor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}(", self.visibility, self.name)?;
        let mut params = self.params.iter();
        if let Some(first) = params.next() {
            write!(f, "{}: {}", first.name, first.ty)?;
            for param in params {
                write!(f, ", {}: {}", param.name, param.ty)?;
            }
        }
        write!(f, ")")
    }
}
