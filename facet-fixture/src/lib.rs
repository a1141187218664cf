#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

use alloc::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

pub mod types;
pub use types::{
    Arguments, Constructor, Def, Field, FieldAttribute, FieldFlags, GenericBindings, Shape,
    ShapeAttribute, StructDef, TypeRef, Visibility,
};

mod config;
pub use config::*;

mod error;
pub use error::*;

mod value;
pub use value::*;

mod registry;
pub use registry::*;

/// Annotation-driven strategy selection and value providers
pub mod strategy;
pub use strategy::{ValueProvider, from_fn};

/// Scalar value generation
pub mod primitive;
pub use primitive::PrimitiveGenerator;

pub mod introspect;
pub use introspect::Introspector;

mod populate;
pub use populate::MAX_DISTINCT_ATTEMPTS;

mod engine;
mod memo;

/// Manufactures instances of registered shapes.
///
/// Owns its configuration and random source; the registry is shared. Each
/// call to [`Fixture::manufacture`] starts with an empty memo and an empty
/// construction stack.
pub struct Fixture {
    registry: Arc<ShapeRegistry>,
    config: FixtureConfig,
    rng: Box<dyn RngCore + Send>,
}

impl Fixture {
    /// A fixture seeded from the operating system's entropy source.
    pub fn new(registry: impl Into<Arc<ShapeRegistry>>) -> Self {
        Self::with_rng(registry, StdRng::from_entropy())
    }

    /// A fixture whose output is fully determined by `seed`.
    pub fn seeded(registry: impl Into<Arc<ShapeRegistry>>, seed: u64) -> Self {
        Self::with_rng(registry, StdRng::seed_from_u64(seed))
    }

    /// A fixture drawing from `rng`.
    pub fn with_rng(
        registry: impl Into<Arc<ShapeRegistry>>,
        rng: impl RngCore + Send + 'static,
    ) -> Self {
        Self {
            registry: registry.into(),
            config: FixtureConfig::default(),
            rng: Box::new(rng),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: FixtureConfig) -> Self {
        self.config = config;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// The configuration, for changes between calls.
    pub fn config_mut(&mut self) -> &mut FixtureConfig {
        &mut self.config
    }

    /// The shared registry.
    pub fn registry(&self) -> &Arc<ShapeRegistry> {
        &self.registry
    }

    /// Manufactures a fully populated value of `ty`.
    ///
    /// On failure no partial instance is returned; the error carries the
    /// path to the failing construction site.
    pub fn manufacture(&mut self, ty: &TypeRef) -> Result<Instance, FixtureError> {
        log::debug!("Manufacturing {ty}");
        engine::Engine::new(&self.registry, &self.config, &mut *self.rng).manufacture(ty)
    }

    /// Parses `ty` (e.g. `"HashMap<String, i32>"`) and manufactures it.
    pub fn manufacture_str(&mut self, ty: &str) -> Result<Instance, FixtureError> {
        let ty = TypeRef::parse(ty).map_err(FixtureErrorKind::InvalidTypeRef)?;
        self.manufacture(&ty)
    }
}

impl core::fmt::Debug for Fixture {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Fixture")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A manufactured value, with the type it was requested as.
#[derive(Clone, Debug)]
pub struct Instance {
    /// The requested type
    pub ty: TypeRef,

    /// The shape the value was built from: the substitute's shape for
    /// abstract types, `None` for arrays
    pub shape: Option<Arc<Shape>>,

    /// The value
    pub value: Value,
}

impl Instance {
    /// The value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Takes the value out.
    pub fn into_value(self) -> Value {
        self.value
    }
}

impl core::ops::Deref for Instance {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.value
    }
}
