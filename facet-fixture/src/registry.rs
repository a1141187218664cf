use alloc::sync::Arc;
use std::collections::HashMap;

use crate::config::OBJECT;
use crate::strategy::ValueProvider;
use crate::types::{
    Constructor, Def, Field, ListDef, MapDef, PointerDef, ScalarKind, Shape, StructDef, TypeRef,
};

/// Every shape the engine knows about, the concrete substitutes of
/// abstract types, and the registered value providers.
///
/// Built once, then shared read-only (usually behind an [`Arc`]) by any
/// number of [`crate::Fixture`]s.
#[derive(Clone)]
pub struct ShapeRegistry {
    shapes: HashMap<String, Arc<Shape>>,
    substitutes: HashMap<String, TypeRef>,
    strategies: HashMap<String, Arc<dyn ValueProvider>>,
}

impl ShapeRegistry {
    /// A registry holding the built-in scalars, containers, wrappers and
    /// the `Object` placeholder.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        for &kind in ScalarKind::ALL {
            registry.register(Shape::scalar(kind));
        }

        let t = || TypeRef::named("T");
        for name in ["Vec", "VecDeque"] {
            registry.register(generic(name, &["T"], Def::List(ListDef::new(t()))));
        }
        for name in ["HashSet", "BTreeSet"] {
            registry.register(generic(name, &["T"], Def::Set(ListDef::new(t()))));
        }
        for name in ["HashMap", "BTreeMap"] {
            registry.register(generic(
                name,
                &["K", "V"],
                Def::Map(MapDef::new(TypeRef::named("K"), TypeRef::named("V"))),
            ));
        }
        registry.register(generic("Option", &["T"], Def::Option(PointerDef::new(t()))));
        for name in ["Box", "Rc", "Arc"] {
            registry.register(generic(name, &["T"], Def::Pointer(PointerDef::new(t()))));
        }

        registry.register(
            Shape::builder(OBJECT)
                .def(Def::Struct(
                    StructDef::new()
                        .field(Field::new("identity", TypeRef::named("u64")))
                        .constructor(Constructor::public()),
                ))
                .doc("Placeholder element of raw containers; no two compare equal")
                .build(),
        );

        registry
    }

    /// A registry with nothing in it, not even scalars.
    pub fn empty() -> Self {
        Self {
            shapes: HashMap::new(),
            substitutes: HashMap::new(),
            strategies: HashMap::new(),
        }
    }

    /// Registers `shape` under its type identifier, replacing any shape
    /// registered under the same name.
    pub fn register(&mut self, shape: Shape) -> &mut Self {
        log::trace!("Registering shape {shape}");
        self.shapes
            .insert(shape.type_identifier.clone(), Arc::new(shape));
        self
    }

    /// Manufacture `concrete` wherever the abstract type `abstract_name` is
    /// requested.
    pub fn substitute(&mut self, abstract_name: impl Into<String>, concrete: TypeRef) -> &mut Self {
        self.substitutes.insert(abstract_name.into(), concrete);
        self
    }

    /// Registers a value provider under `key`, for use by strategy
    /// attributes.
    pub fn register_strategy(
        &mut self,
        key: impl Into<String>,
        provider: impl ValueProvider + 'static,
    ) -> &mut Self {
        self.strategies.insert(key.into(), Arc::new(provider));
        self
    }

    /// The shape registered under `type_identifier`.
    pub fn shape(&self, type_identifier: &str) -> Option<&Arc<Shape>> {
        self.shapes.get(type_identifier)
    }

    /// The shape a type reference names. `None` for arrays and unknown
    /// names.
    pub fn shape_of(&self, ty: &TypeRef) -> Option<&Arc<Shape>> {
        ty.name().and_then(|name| self.shape(name))
    }

    /// The concrete type registered for an abstract type.
    pub fn substitute_for(&self, abstract_name: &str) -> Option<&TypeRef> {
        self.substitutes.get(abstract_name)
    }

    /// The provider registered under `key`.
    pub fn strategy(&self, key: &str) -> Option<&Arc<dyn ValueProvider>> {
        self.strategies.get(key)
    }

    /// Number of registered shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Whether no shape is registered.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Whether a value of type `produced` may be placed at a site of type
    /// `site`.
    ///
    /// That holds when both are equal, when the site is `Object`, when the
    /// site is an abstract type that `produced` implements or is registered
    /// as the substitute of, or when the site is an option or pointer whose
    /// inner type accepts `produced`.
    pub fn is_assignable(&self, produced: &TypeRef, site: &TypeRef) -> bool {
        if produced == site {
            return true;
        }
        if *site == TypeRef::named(OBJECT) {
            return true;
        }

        let Some(site_shape) = self.shape_of(site) else {
            return false;
        };
        match &site_shape.def {
            Def::Abstract => {
                if self.substitute_for(&site_shape.type_identifier) == Some(produced) {
                    return true;
                }
                self.shape_of(produced)
                    .and_then(|shape| shape.as_struct())
                    .is_some_and(|def| {
                        def.implements
                            .iter()
                            .any(|name| *name == site_shape.type_identifier)
                    })
            }
            Def::Option(_) | Def::Pointer(_) => match site.args() {
                [inner] => self.is_assignable(produced, inner),
                _ => false,
            },
            _ => false,
        }
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut shapes: Vec<_> = self.shapes.keys().collect();
        shapes.sort();
        let mut strategies: Vec<_> = self.strategies.keys().collect();
        strategies.sort();
        f.debug_struct("ShapeRegistry")
            .field("shapes", &shapes)
            .field("substitutes", &self.substitutes)
            .field("strategies", &strategies)
            .finish()
    }
}

fn generic(name: &str, params: &[&str], def: Def) -> Shape {
    Shape::builder(name)
        .type_params(params.iter().copied())
        .def(def)
        .build()
}
