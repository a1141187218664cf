//! Turns a use-site type reference into what the engine needs to know to
//! build it. Pure metadata: nothing here generates values or consumes
//! randomness.

use alloc::sync::Arc;
use core::cmp::Reverse;
use std::collections::HashMap;

use crate::types::{
    Constructor, Def, Field, FieldAttribute, GenericBindings, ScalarKind, Shape, TypeRef,
};
use crate::{FixtureConfig, FixtureError, FixtureErrorKind, ShapeRegistry};

/// Resolves type references against a [`ShapeRegistry`].
pub struct Introspector<'a> {
    registry: &'a ShapeRegistry,
    fallback: TypeRef,
    allow_nulls: bool,
}

/// The resolved view of one bound type.
#[derive(Clone, Debug)]
pub struct Introspected {
    /// The concrete, fully bound type; differs from the requested one when
    /// an abstract type was substituted
    pub ty: TypeRef,

    /// The concrete type's shape, `None` for arrays
    pub shape: Option<Arc<Shape>>,

    /// The shape's generic parameters, bound from the use-site
    pub bindings: GenericBindings,

    /// What the engine does with it
    pub view: View,
}

/// What a bound type looks like to the engine. Every type reference in here
/// is fully bound.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum View {
    /// A scalar for the primitive generator
    Scalar(ScalarKind),

    /// A record
    Record {
        /// Type identifier
        type_name: String,
        /// Construction paths, best first
        candidates: Vec<Candidate>,
        /// Fields in declaration order
        fields: Vec<Field>,
    },

    /// An enumeration
    Enum {
        /// Type identifier
        type_name: String,
        /// Constants in declaration order
        constants: Vec<String>,
    },

    /// A list of `elem`
    List {
        /// Element type
        elem: TypeRef,
    },

    /// A set of `elem`
    Set {
        /// Element type
        elem: TypeRef,
    },

    /// A map from `key` to `value`
    Map {
        /// Key type
        key: TypeRef,
        /// Value type
        value: TypeRef,
    },

    /// An array of `elem`
    Array {
        /// Element type
        elem: TypeRef,
        /// Fixed length, if any
        len: Option<usize>,
    },

    /// A value of `inner` that may be absent
    Option {
        /// Inner type
        inner: TypeRef,
    },

    /// A pointer, built as `inner`
    Pointer {
        /// Pointee type
        inner: TypeRef,
    },
}

/// A ranked construction path.
#[derive(Clone, Debug)]
pub struct Candidate {
    /// The constructor, with parameter types bound
    pub constructor: Constructor,
    /// Position among the declared constructors
    pub declared_at: usize,
}

impl<'a> Introspector<'a> {
    /// An introspector over `registry`, reading the fallback element type and
    /// null allowance from `config`.
    pub fn new(registry: &'a ShapeRegistry, config: &FixtureConfig) -> Self {
        let fallback = TypeRef::parse(&config.fallback_element)
            .unwrap_or_else(|_| TypeRef::named(config.fallback_element.as_str()));
        Self {
            registry,
            fallback,
            allow_nulls: config.allow_nulls,
        }
    }

    /// The registry types are resolved against.
    pub fn registry(&self) -> &'a ShapeRegistry {
        self.registry
    }

    /// Resolves `ty`, written in a context where `bindings` are in effect.
    pub fn introspect(
        &self,
        ty: &TypeRef,
        bindings: &GenericBindings,
    ) -> Result<Introspected, FixtureError> {
        self.introspect_bound(&ty.substitute(bindings))
    }

    /// Resolves an already bound `ty`.
    pub fn introspect_bound(&self, ty: &TypeRef) -> Result<Introspected, FixtureError> {
        let (name, args) = match ty {
            TypeRef::Array { elem, len } => {
                return Ok(Introspected {
                    ty: ty.clone(),
                    shape: None,
                    bindings: GenericBindings::empty(),
                    view: View::Array {
                        elem: (**elem).clone(),
                        len: *len,
                    },
                });
            }
            TypeRef::Named { name, args } => (name, args),
        };

        let shape = self
            .registry
            .shape(name)
            .ok_or_else(|| unresolvable(ty, "no shape registered under this name"))?;

        if matches!(shape.def, Def::Abstract) {
            return self.substituted(ty, shape);
        }

        let bindings = self.bind(ty, shape, args)?;
        let view = match &shape.def {
            Def::Scalar(kind) => View::Scalar(*kind),
            Def::Struct(def) => {
                if def.constructors.is_empty() {
                    return Err(unresolvable(ty, "no constructor or static factory"));
                }
                let fields = def
                    .fields
                    .iter()
                    .map(|field| bind_field(field, &bindings))
                    .collect();
                let mut candidates = rank(&def.constructors);
                for candidate in &mut candidates {
                    for param in &mut candidate.constructor.params {
                        param.ty = param.ty.substitute(&bindings);
                        if param.attributes.is_empty() {
                            if let Some(field) = def.field_by_name(&param.name) {
                                param.attributes = field.attributes.clone();
                            }
                        }
                    }
                }
                View::Record {
                    type_name: shape.type_identifier.clone(),
                    candidates,
                    fields,
                }
            }
            Def::Enum(def) => View::Enum {
                type_name: shape.type_identifier.clone(),
                constants: def.constants.clone(),
            },
            Def::List(def) => View::List {
                elem: def.t.substitute(&bindings),
            },
            Def::Set(def) => View::Set {
                elem: def.t.substitute(&bindings),
            },
            Def::Map(def) => View::Map {
                key: def.k.substitute(&bindings),
                value: def.v.substitute(&bindings),
            },
            Def::Option(def) => View::Option {
                inner: def.pointee.substitute(&bindings),
            },
            Def::Pointer(def) => View::Pointer {
                inner: def.pointee.substitute(&bindings),
            },
            Def::Abstract => return self.substituted(ty, shape),
        };

        Ok(Introspected {
            ty: ty.clone(),
            shape: Some(shape.clone()),
            bindings,
            view,
        })
    }

    fn substituted(&self, ty: &TypeRef, shape: &Arc<Shape>) -> Result<Introspected, FixtureError> {
        let mut seen = vec![shape.type_identifier.as_str()];
        let mut concrete = self
            .registry
            .substitute_for(&shape.type_identifier)
            .ok_or_else(|| unresolvable(ty, "abstract type without a registered substitute"))?;

        // substitutes may themselves be abstract
        loop {
            let next = concrete
                .name()
                .filter(|name| {
                    self.registry
                        .shape(name)
                        .is_some_and(|s| matches!(s.def, Def::Abstract))
                })
                .and_then(|name| {
                    if seen.contains(&name) {
                        None
                    } else {
                        seen.push(name);
                        Some(self.registry.substitute_for(name))
                    }
                });
            match next {
                None => break,
                Some(Some(further)) => concrete = further,
                Some(None) => {
                    return Err(unresolvable(
                        ty,
                        "abstract type without a registered substitute",
                    ));
                }
            }
        }

        if concrete.name().is_some_and(|name| seen.contains(&name)) {
            return Err(unresolvable(ty, "substitutes form a cycle"));
        }

        log::debug!("Substituting {ty} with {concrete}");
        self.introspect_bound(concrete)
    }

    fn bind(
        &self,
        ty: &TypeRef,
        shape: &Shape,
        args: &[TypeRef],
    ) -> Result<GenericBindings, FixtureError> {
        if args.is_empty() {
            // raw use of a generic type
            return Ok(shape
                .type_params
                .iter()
                .map(|param| (param.as_str(), self.fallback.clone()))
                .collect());
        }
        if args.len() != shape.type_params.len() {
            return Err(unresolvable(ty, "wrong number of generic arguments"));
        }
        Ok(shape
            .type_params
            .iter()
            .map(String::as_str)
            .zip(args.iter().cloned())
            .collect())
    }

    /// Whether `ty`, written where `bindings` are in effect, has some way to
    /// be built.
    pub fn is_resolvable(&self, ty: &TypeRef, bindings: &GenericBindings) -> bool {
        self.is_resolvable_within(&ty.substitute(bindings), &[], &mut Verdicts::default())
    }

    /// Like [`Introspector::is_resolvable`] for a bound `ty`, counting the
    /// record types under construction in `active` as resolvable.
    ///
    /// Settled answers are kept in `verdicts`, so repeated checks during one
    /// call walk each type once.
    pub fn is_resolvable_within(
        &self,
        ty: &TypeRef,
        active: &[TypeRef],
        verdicts: &mut Verdicts,
    ) -> bool {
        self.resolvable(ty, &mut Walk::new(active, verdicts)).0
    }

    /// Whether a parameter can be given a value: it has a literal or a
    /// strategy, it may be null, or its type is resolvable.
    pub fn is_param_resolvable(
        &self,
        param: &Field,
        active: &[TypeRef],
        verdicts: &mut Verdicts,
    ) -> bool {
        self.param_resolvable(param, &mut Walk::new(active, verdicts)).0
    }

    fn param_resolvable(&self, param: &Field, walk: &mut Walk<'_>) -> (bool, usize) {
        let free = self.allow_nulls
            || param.is_nullable()
            || param.attributes.iter().any(|attr| {
                matches!(attr, FieldAttribute::Value(_) | FieldAttribute::Strategy(_))
            });
        if free {
            return (true, SETTLED);
        }
        self.resolvable(&param.ty, walk)
    }

    /// Returns the verdict and the lowest position in `walk.visiting` it
    /// was assumed from, or [`SETTLED`].
    fn resolvable(&self, ty: &TypeRef, walk: &mut Walk<'_>) -> (bool, usize) {
        if let Some(&known) = walk.verdicts.known.get(ty) {
            return (known, SETTLED);
        }
        if let Some(at) = walk.position(ty) {
            return (true, at);
        }

        let (ok, low) = self.resolvable_uncached(ty, walk);
        let provisional = ok && low != SETTLED && low >= walk.floor;
        if !provisional {
            walk.verdicts.known.insert(ty.clone(), ok);
        }
        (ok, low)
    }

    fn resolvable_uncached(&self, ty: &TypeRef, walk: &mut Walk<'_>) -> (bool, usize) {
        // values of the type come from a provider, whatever its shape
        if self
            .registry
            .shape_of(ty)
            .is_some_and(|shape| shape.strategy_attr().is_some())
        {
            return (true, SETTLED);
        }
        let Ok(found) = self.introspect_bound(ty) else {
            return (false, SETTLED);
        };
        match &found.view {
            View::Scalar(_) | View::Option { .. } => (true, SETTLED),
            View::Enum { constants, .. } => (!constants.is_empty(), SETTLED),
            View::Record { candidates, .. } => {
                if let Some(at) = walk.position(&found.ty) {
                    return (true, at);
                }
                let depth = walk.visiting.len();
                walk.visiting.push(found.ty.clone());
                let mut low = SETTLED;
                let ok = candidates.iter().any(|candidate| {
                    candidate.constructor.params.iter().all(|param| {
                        let (ok, at) = self.param_resolvable(param, walk);
                        low = low.min(at);
                        ok
                    })
                });
                walk.visiting.pop();
                // assuming the record itself holds is sound once it is popped
                if low >= depth {
                    low = SETTLED;
                }
                (ok, low)
            }
            View::List { elem } | View::Set { elem } | View::Array { elem, .. } => {
                self.resolvable(elem, walk)
            }
            View::Map { key, value } => {
                let (ok, low) = self.resolvable(key, walk);
                if !ok {
                    return (false, low);
                }
                let (ok, at) = self.resolvable(value, walk);
                (ok, low.min(at))
            }
            View::Pointer { inner } => self.resolvable(inner, walk),
        }
    }
}

/// No assumption about a type still being walked went into a verdict.
const SETTLED: usize = usize::MAX;

/// Resolvability answers known to hold for the rest of one manufacturing
/// call.
///
/// A negative answer is always kept. A positive one is kept unless it rests
/// on the assumption that some type further up the same walk resolves.
#[derive(Debug, Default)]
pub struct Verdicts {
    known: HashMap<TypeRef, bool>,
}

impl Verdicts {
    /// An empty set of verdicts.
    pub fn new() -> Self {
        Self::default()
    }

    /// The kept answer for `ty`, if any.
    pub fn get(&self, ty: &TypeRef) -> Option<bool> {
        self.known.get(ty).copied()
    }

    /// Number of kept answers.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// Whether no answer is kept.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

/// One resolvability walk. The first `floor` entries of `visiting` are the
/// records under construction, which hold by the time they are checked.
struct Walk<'v> {
    visiting: Vec<TypeRef>,
    floor: usize,
    verdicts: &'v mut Verdicts,
}

impl<'v> Walk<'v> {
    fn new(active: &[TypeRef], verdicts: &'v mut Verdicts) -> Self {
        Self {
            visiting: active.to_vec(),
            floor: active.len(),
            verdicts,
        }
    }

    fn position(&self, ty: &TypeRef) -> Option<usize> {
        self.visiting.iter().position(|visited| visited == ty)
    }
}

/// Orders constructors best first: preferred ones, then by visibility,
/// then by parameter count (more first), then in declaration order.
pub fn rank(constructors: &[Constructor]) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = constructors
        .iter()
        .enumerate()
        .map(|(declared_at, constructor)| Candidate {
            constructor: constructor.clone(),
            declared_at,
        })
        .collect();
    candidates.sort_by_key(|candidate| {
        let c = &candidate.constructor;
        (
            !c.is_preferred(),
            c.visibility,
            Reverse(c.params.len()),
            candidate.declared_at,
        )
    });
    candidates
}

fn bind_field(field: &Field, bindings: &GenericBindings) -> Field {
    let mut field = field.clone();
    field.ty = field.ty.substitute(bindings);
    field
}

fn unresolvable(ty: &TypeRef, reason: &'static str) -> FixtureError {
    FixtureErrorKind::UnresolvableShape {
        ty: ty.clone(),
        reason,
    }
    .into()
}
