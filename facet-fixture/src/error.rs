use crate::types::{TypeRef, TypeRefError};

/// Error manufacturing a value, with the construction site it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureError {
    /// What went wrong
    pub kind: FixtureErrorKind,

    /// Where it went wrong, outermost site first
    pub path: SitePath,
}

impl FixtureError {
    /// An error with an empty path; callers add segments on the way out.
    pub fn new(kind: FixtureErrorKind) -> Self {
        Self {
            kind,
            path: SitePath::default(),
        }
    }

    /// Prepends `segment`: used by each enclosing site as the error
    /// propagates outward.
    pub fn within(mut self, segment: Segment) -> Self {
        self.path.segments.insert(0, segment);
        self
    }
}

impl From<FixtureErrorKind> for FixtureError {
    fn from(kind: FixtureErrorKind) -> Self {
        Self::new(kind)
    }
}

impl core::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} (at {})", self.kind, self.path)
        }
    }
}

impl core::error::Error for FixtureError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match &self.kind {
            FixtureErrorKind::InvalidTypeRef(e) => Some(e),
            _ => None,
        }
    }
}

/// Kinds of manufacturing failure. All of them are terminal.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum FixtureErrorKind {
    /// A declared literal or hint cannot be converted to the target type
    InvalidAnnotationValue {
        /// The site's type
        target: TypeRef,
        /// The offending annotation text
        literal: String,
        /// Why it was rejected
        reason: String,
    },

    /// A registered strategy produces a type the site cannot hold
    StrategyTypeMismatch {
        /// Strategy key
        key: String,
        /// What the strategy declares it produces
        produces: TypeRef,
        /// What the site needs
        expected: TypeRef,
    },

    /// A strategy key that nothing was registered under
    UnknownStrategy {
        /// Strategy key
        key: String,
    },

    /// A type with no construction path and no registered substitute
    UnresolvableShape {
        /// The type
        ty: TypeRef,
        /// Why it cannot be built
        reason: &'static str,
    },

    /// Every construction candidate has a parameter that cannot be resolved
    NoUsableConstructor {
        /// The type
        ty: TypeRef,
        /// Number of candidates that were considered
        candidates: usize,
    },

    /// An enumeration without constants
    EmptyEnumeration {
        /// The enumeration
        ty: TypeRef,
    },

    /// Nesting went deeper than the configured bound
    MaxDepthExceeded {
        /// The type that would have gone one level too deep
        ty: TypeRef,
        /// The configured bound
        max_depth: usize,
    },

    /// A type reference string that does not parse
    InvalidTypeRef(TypeRefError),
}

impl core::fmt::Display for FixtureErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FixtureErrorKind::InvalidAnnotationValue {
                target,
                literal,
                reason,
            } => write!(
                f,
                "Invalid annotation value {literal:?} for {target}: {reason}"
            ),
            FixtureErrorKind::StrategyTypeMismatch {
                key,
                produces,
                expected,
            } => write!(
                f,
                "Strategy '{key}' produces {produces}, which is not assignable to {expected}"
            ),
            FixtureErrorKind::UnknownStrategy { key } => {
                write!(f, "No strategy registered under '{key}'")
            }
            FixtureErrorKind::UnresolvableShape { ty, reason } => {
                write!(f, "Cannot resolve {ty}: {reason}")
            }
            FixtureErrorKind::NoUsableConstructor { ty, candidates } => write!(
                f,
                "None of the {candidates} construction candidates of {ty} has resolvable parameters"
            ),
            FixtureErrorKind::EmptyEnumeration { ty } => {
                write!(f, "Enumeration {ty} declares no constants")
            }
            FixtureErrorKind::MaxDepthExceeded { ty, max_depth } => write!(
                f,
                "Maximum depth {max_depth} exceeded while manufacturing {ty}"
            ),
            FixtureErrorKind::InvalidTypeRef(e) => write!(f, "Invalid type reference: {e}"),
        }
    }
}

/// One step of a construction-site path
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Segment {
    /// A record (or the requested root type)
    Type(TypeRef),
    /// A field assigned after construction
    Field(String),
    /// A constructor or factory parameter
    Param {
        /// Constructor name
        constructor: String,
        /// Parameter name
        name: String,
    },
    /// Element of a list, set or array
    Index(usize),
    /// Key of the n-th map entry
    Key(usize),
    /// Value of the n-th map entry
    Entry(usize),
}

/// Path from the requested type down to the failing site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitePath {
    /// Outermost first
    pub segments: Vec<Segment>,
}

impl SitePath {
    /// Whether the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The outermost segment.
    pub fn first(&self) -> Option<&Segment> {
        self.segments.first()
    }
}

impl core::fmt::Display for SitePath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Type(ty) if i == 0 => write!(f, "{ty}")?,
                Segment::Type(ty) => write!(f, "({ty})")?,
                Segment::Field(name) => write!(f, ".{name}")?,
                Segment::Param { constructor, name } => write!(f, "::{constructor}({name})")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Key(index) => write!(f, "[key #{index}]")?,
                Segment::Entry(index) => write!(f, "[value #{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_site_paths() {
        let err = FixtureError::new(FixtureErrorKind::EmptyEnumeration {
            ty: TypeRef::named("Mood"),
        })
        .within(Segment::Field("mood".into()))
        .within(Segment::Type(TypeRef::named("Person")))
        .within(Segment::Param {
            constructor: "new".into(),
            name: "owner".into(),
        })
        .within(Segment::Type(TypeRef::named("Shelf")))
        .within(Segment::Index(2))
        .within(Segment::Entry(0))
        .within(Segment::Type(TypeRef::parse("HashMap<u8, Vec<Shelf>>").unwrap()));
        insta::assert_snapshot!(
            err,
            @"Enumeration Mood declares no constants (at HashMap<u8, Vec<Shelf>>[value #0][2](Shelf)::new(owner)(Person).mood)"
        );
    }
}
