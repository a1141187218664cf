use std::collections::HashMap;

use crate::Value;
use crate::types::TypeRef;

/// Record instances built during one top-level call, keyed by the rendered
/// bound type (`Box<Person>` and `Box<Address>` are different entries).
#[derive(Debug, Default)]
pub(crate) struct MemoCache {
    enabled: bool,
    entries: HashMap<String, Value>,
}

impl MemoCache {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            entries: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, ty: &TypeRef) -> Option<&Value> {
        if !self.enabled {
            return None;
        }
        self.entries.get(&ty.to_string())
    }

    pub(crate) fn insert(&mut self, ty: &TypeRef, value: &Value) {
        if self.enabled {
            self.entries.insert(ty.to_string(), value.clone());
        }
    }
}

/// Record types currently under construction, outermost first.
#[derive(Debug, Default)]
pub(crate) struct ActiveStack {
    frames: Vec<TypeRef>,
}

impl ActiveStack {
    pub(crate) fn contains(&self, ty: &TypeRef) -> bool {
        self.frames.contains(ty)
    }

    pub(crate) fn push(&mut self, ty: TypeRef) {
        self.frames.push(ty);
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    pub(crate) fn as_slice(&self) -> &[TypeRef] {
        &self.frames
    }
}
