//! The synthesis engine: drives one top-level manufacturing call, depth
//! first, through the phases of [`Phase`].

use log::{debug, trace};
use owo_colors::OwoColorize;
use rand::{Rng, RngCore};

use crate::error::Segment;
use crate::introspect::{Candidate, Introspector, Verdicts, View};
use crate::memo::{ActiveStack, MemoCache};
use crate::populate::{self, Container};
use crate::primitive::PrimitiveGenerator;
use crate::strategy::{self, Constraints, ProviderRef, ValueStrategy};
use crate::types::{Arguments, Field, FieldAttribute, TypeRef};
use crate::{
    FixtureConfig, FixtureError, FixtureErrorKind, Instance, OBJECT, ShapeRegistry, Value,
};

/// Where the engine is, for one construction site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    /// A value of some type was asked for
    Requested,
    /// Looking for a record built earlier in the same call
    MemoCheck,
    /// Found one
    CacheHit,
    /// Resolving the type to a view
    Introspecting,
    /// Choosing the construction path
    CandidateSelection,
    /// Manufacturing constructor arguments
    ArgumentResolution,
    /// Running the constructor, then assigning the remaining fields
    Invoking,
    /// The type is already under construction further up
    CycleFallback,
    /// The value is complete
    Done,
}

/// Per-call state: everything here is dropped when the top-level call
/// returns.
pub(crate) struct Engine<'a> {
    introspector: Introspector<'a>,
    config: &'a FixtureConfig,
    primitives: PrimitiveGenerator,
    rng: &'a mut dyn RngCore,
    memo: MemoCache,
    stack: ActiveStack,
    verdicts: Verdicts,
    depth: usize,
}

impl<'a> Engine<'a> {
    pub(crate) fn new(
        registry: &'a ShapeRegistry,
        config: &'a FixtureConfig,
        rng: &'a mut dyn RngCore,
    ) -> Self {
        Self {
            introspector: Introspector::new(registry, config),
            config,
            primitives: PrimitiveGenerator::new(config.string_length),
            rng,
            memo: MemoCache::new(config.memoization),
            stack: ActiveStack::default(),
            verdicts: Verdicts::new(),
            depth: 0,
        }
    }

    /// Manufactures a value of `ty`; errors carry a path rooted at `ty`.
    pub(crate) fn manufacture(mut self, ty: &TypeRef) -> Result<Instance, FixtureError> {
        let value = self.site(ty, &[]).map_err(|err| {
            let root = Segment::Type(ty.clone());
            if err.path.first() == Some(&root) {
                err
            } else {
                err.within(root)
            }
        })?;
        let shape = self
            .introspector
            .introspect_bound(ty)
            .ok()
            .and_then(|found| found.shape);
        Ok(Instance {
            ty: ty.clone(),
            shape,
            value,
        })
    }

    fn phase(&self, phase: Phase, ty: &TypeRef) {
        trace!("[{}] {:?} {}", self.depth, phase.yellow(), ty.blue());
    }

    /// One construction site: a field, a parameter, a container slot or
    /// the root.
    pub(crate) fn site(
        &mut self,
        ty: &TypeRef,
        attributes: &[FieldAttribute],
    ) -> Result<Value, FixtureError> {
        if self.depth > self.config.max_depth {
            return Err(FixtureErrorKind::MaxDepthExceeded {
                ty: ty.clone(),
                max_depth: self.config.max_depth,
            }
            .into());
        }

        self.depth += 1;
        let result = self.resolve_site(ty, attributes);
        self.depth -= 1;
        result
    }

    fn resolve_site(
        &mut self,
        ty: &TypeRef,
        attributes: &[FieldAttribute],
    ) -> Result<Value, FixtureError> {
        self.phase(Phase::Requested, ty);
        match strategy::resolve(&self.introspector, ty, attributes)? {
            ValueStrategy::Literal(value) => {
                trace!("Literal {} for {}", value.green(), ty.blue());
                Ok(value)
            }
            ValueStrategy::External(provider) => Ok(self.provided(&provider)),
            ValueStrategy::Default(constraints) => self.structural(ty, attributes, &constraints),
        }
    }

    fn structural(
        &mut self,
        ty: &TypeRef,
        attributes: &[FieldAttribute],
        constraints: &Constraints,
    ) -> Result<Value, FixtureError> {
        self.phase(Phase::MemoCheck, ty);
        if let Some(value) = self.memo.get(ty) {
            debug!("Reusing the {} built earlier in this call", ty.blue());
            let value = value.clone();
            self.phase(Phase::CacheHit, ty);
            return Ok(value);
        }

        self.phase(Phase::Introspecting, ty);
        let found = self.introspector.introspect_bound(ty)?;
        let concrete = found.ty;

        match found.view {
            View::Scalar(kind) => self.primitives.generate(kind, constraints, &mut *self.rng),
            View::Enum {
                type_name,
                constants,
            } => {
                if constants.is_empty() {
                    return Err(FixtureErrorKind::EmptyEnumeration { ty: concrete }.into());
                }
                let index = self.rng.gen_range(0..constants.len());
                Ok(Value::Enum {
                    type_name,
                    constant: constants[index].clone(),
                })
            }
            View::Record {
                type_name,
                candidates,
                fields,
            } => self.record(ty, &concrete, type_name, candidates, fields),
            View::List { elem } => {
                populate::populate(self, Container::List { elem }, constraints, attributes)
            }
            View::Set { elem } => {
                populate::populate(self, Container::Set { elem }, constraints, attributes)
            }
            View::Map { key, value } => {
                populate::populate(self, Container::Map { key, value }, constraints, attributes)
            }
            View::Array { elem, len } => populate::populate(
                self,
                Container::Array { elem, len },
                constraints,
                attributes,
            ),
            View::Option { inner } => {
                if self.is_resolvable(&inner) {
                    self.site(&inner, attributes)
                } else {
                    debug!("{} cannot be resolved, using none", inner.blue());
                    Ok(Value::Null)
                }
            }
            View::Pointer { inner } => self.site(&inner, attributes),
        }
    }

    fn record(
        &mut self,
        requested: &TypeRef,
        concrete: &TypeRef,
        type_name: String,
        candidates: Vec<Candidate>,
        fields: Vec<Field>,
    ) -> Result<Value, FixtureError> {
        if self.stack.contains(concrete) {
            self.phase(Phase::CycleFallback, concrete);
            debug!("{} is already under construction, using null", concrete.blue());
            return Ok(Value::Null);
        }

        self.stack.push(concrete.clone());
        let result = self
            .build_record(concrete, type_name, candidates, &fields)
            .map_err(|err| err.within(Segment::Type(concrete.clone())));
        self.stack.pop();

        let value = result?;
        // every placeholder is a distinct object
        if concrete.name() != Some(OBJECT) {
            self.memo.insert(requested, &value);
        }
        self.phase(Phase::Done, concrete);
        Ok(value)
    }

    fn build_record(
        &mut self,
        ty: &TypeRef,
        type_name: String,
        candidates: Vec<Candidate>,
        fields: &[Field],
    ) -> Result<Value, FixtureError> {
        self.phase(Phase::CandidateSelection, ty);
        let total = candidates.len();
        let chosen = candidates.into_iter().find(|candidate| {
            candidate
                .constructor
                .params
                .iter()
                .all(|param| {
                    self.introspector.is_param_resolvable(
                        param,
                        self.stack.as_slice(),
                        &mut self.verdicts,
                    )
                })
        });
        let Some(Candidate { constructor, .. }) = chosen else {
            return Err(FixtureErrorKind::NoUsableConstructor {
                ty: ty.clone(),
                candidates: total,
            }
            .into());
        };
        debug!("Building {} with {}", ty.blue(), constructor.green());

        self.phase(Phase::ArgumentResolution, ty);
        let mut args = Vec::with_capacity(constructor.params.len());
        for param in &constructor.params {
            let value = self.member(param).map_err(|err| {
                err.within(Segment::Param {
                    constructor: constructor.name.clone(),
                    name: param.name.clone(),
                })
            })?;
            args.push((param.name.clone(), value));
        }

        self.phase(Phase::Invoking, ty);
        let (mut value, assigned) = match &constructor.invoker {
            Some(invoker) => {
                let value = invoker(Arguments {
                    type_name,
                    values: args,
                });
                let assigned: Vec<String> = value
                    .fields()
                    .map(|set| set.iter().map(|(name, _)| name.clone()).collect())
                    .unwrap_or_default();
                (value, assigned)
            }
            None => {
                let mut slots: Vec<(String, Value)> = fields
                    .iter()
                    .map(|field| (field.name.clone(), Value::Null))
                    .collect();
                let mut assigned = Vec::with_capacity(args.len());
                for (name, arg) in args {
                    match slots.iter_mut().find(|(slot, _)| *slot == name) {
                        Some(slot) => {
                            slot.1 = arg;
                            assigned.push(name);
                        }
                        None => debug!("Parameter {} of {} binds no field", name.red(), constructor),
                    }
                }
                (
                    Value::Record {
                        type_name,
                        fields: slots,
                    },
                    assigned,
                )
            }
        };

        // factories may hand back something other than a record
        if let Value::Record { fields: slots, .. } = &mut value {
            for field in fields {
                if assigned.contains(&field.name) {
                    continue;
                }
                let assigned_value = if field.is_excluded() || !field.is_settable() {
                    trace!("Leaving {} ({}) unset", field.name.blue(), field.flags);
                    Value::Null
                } else {
                    self.member(field)
                        .map_err(|err| err.within(Segment::Field(field.name.clone())))?
                };
                match slots.iter_mut().find(|(slot, _)| *slot == field.name) {
                    Some(slot) => slot.1 = assigned_value,
                    None => slots.push((field.name.clone(), assigned_value)),
                }
            }
        }
        Ok(value)
    }

    /// A constructor parameter or a record field. Members that may be null
    /// stay null when their type cannot be resolved.
    fn member(&mut self, member: &Field) -> Result<Value, FixtureError> {
        let may_be_null = member.is_nullable() || self.config.allow_nulls;
        let overridden = member.attributes.iter().any(|attr| {
            matches!(attr, FieldAttribute::Value(_) | FieldAttribute::Strategy(_))
        });
        if may_be_null && !overridden && !self.is_resolvable(&member.ty) {
            debug!(
                "{}: {} cannot be resolved, leaving it null",
                member.name.blue(),
                member.ty.red()
            );
            return Ok(Value::Null);
        }
        self.site(&member.ty, &member.attributes)
    }

    fn is_resolvable(&mut self, ty: &TypeRef) -> bool {
        self.introspector
            .is_resolvable_within(ty, self.stack.as_slice(), &mut self.verdicts)
    }

    /// Whether a record of type `ty` is under construction.
    pub(crate) fn is_active(&self, ty: &TypeRef) -> bool {
        self.stack.contains(ty)
    }

    pub(crate) fn provided(&mut self, provider: &ProviderRef) -> Value {
        trace!("Strategy {}", provider.key.cyan());
        provider.provider.generate(&mut *self.rng)
    }

    pub(crate) fn config(&self) -> &FixtureConfig {
        self.config
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }
}
