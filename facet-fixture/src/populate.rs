use log::{debug, trace};
use owo_colors::OwoColorize;

use crate::engine::Engine;
use crate::error::Segment;
use crate::strategy::{Constraints, ProviderRef, element_hints};
use crate::types::{FieldAttribute, TypeRef};
use crate::{FixtureError, Value};

/// How many times a set element or map key that collides with an earlier
/// one is regenerated before its slot is dropped
pub const MAX_DISTINCT_ATTEMPTS: usize = 10;

/// A container to fill, with its bound element types.
pub(crate) enum Container {
    List { elem: TypeRef },
    Set { elem: TypeRef },
    Map { key: TypeRef, value: TypeRef },
    Array { elem: TypeRef, len: Option<usize> },
}

/// Fills `container` with one engine call per element (and per key).
///
/// Fixed-length arrays always get their length; every other container gets
/// the size hint, or the configured collection size.
pub(crate) fn populate(
    engine: &mut Engine<'_>,
    container: Container,
    constraints: &Constraints,
    attributes: &[FieldAttribute],
) -> Result<Value, FixtureError> {
    let size = match &container {
        Container::Array { len: Some(len), .. } => *len,
        _ => constraints
            .size
            .unwrap_or(engine.config().collection_size),
    };
    let hints = element_hints(attributes);
    let element = constraints.element.as_ref();

    match container {
        Container::List { elem } => {
            if cycles(engine, &elem) {
                return Ok(Value::List(Vec::new()));
            }
            trace!("[{}] Filling list of {} with {size}", engine.depth(), elem.blue());
            let mut items = Vec::with_capacity(size);
            for index in 0..size {
                items.push(
                    produce(engine, &elem, element, &hints)
                        .map_err(|err| err.within(Segment::Index(index)))?,
                );
            }
            Ok(Value::List(items))
        }
        Container::Array { elem, len } => {
            if cycles(engine, &elem) {
                // a fixed length holds even without elements to put in it
                return Ok(Value::Array(vec![Value::Null; len.unwrap_or(0)]));
            }
            trace!("[{}] Filling array of {} with {size}", engine.depth(), elem.blue());
            let mut items = Vec::with_capacity(size);
            for index in 0..size {
                items.push(
                    produce(engine, &elem, element, &hints)
                        .map_err(|err| err.within(Segment::Index(index)))?,
                );
            }
            Ok(Value::Array(items))
        }
        Container::Set { elem } => {
            if cycles(engine, &elem) {
                return Ok(Value::Set(Vec::new()));
            }
            trace!("[{}] Filling set of {} with {size}", engine.depth(), elem.blue());
            let mut items: Vec<Value> = Vec::with_capacity(size);
            for index in 0..size {
                let mut attempts = 0;
                loop {
                    let item = produce(engine, &elem, element, &hints)
                        .map_err(|err| err.within(Segment::Index(index)))?;
                    if !items.contains(&item) {
                        items.push(item);
                        break;
                    }
                    attempts += 1;
                    if attempts > MAX_DISTINCT_ATTEMPTS {
                        debug!("No distinct {} for slot {index}, dropping it", elem.red());
                        break;
                    }
                }
            }
            Ok(Value::Set(items))
        }
        Container::Map { key, value } => {
            if cycles(engine, &value) {
                return Ok(Value::Map(Vec::new()));
            }
            trace!(
                "[{}] Filling map of {} to {} with {size}",
                engine.depth(),
                key.blue(),
                value.blue()
            );
            let key_provider = constraints.key.as_ref();
            let mut entries: Vec<(Value, Value)> = Vec::with_capacity(size);
            for index in 0..size {
                let mut attempts = 0;
                let k = loop {
                    let k = produce(engine, &key, key_provider, &[])
                        .map_err(|err| err.within(Segment::Key(index)))?;
                    if !entries.iter().any(|(existing, _)| *existing == k) {
                        break Some(k);
                    }
                    attempts += 1;
                    if attempts > MAX_DISTINCT_ATTEMPTS {
                        debug!("No distinct {} key for slot {index}, dropping it", key.red());
                        break None;
                    }
                };
                let Some(k) = k else {
                    continue;
                };
                let v = produce(engine, &value, element, &hints)
                    .map_err(|err| err.within(Segment::Entry(index)))?;
                entries.push((k, v));
            }
            Ok(Value::Map(entries))
        }
    }
}

/// An element whose type is under construction would only ever be the
/// cycle placeholder.
fn cycles(engine: &Engine<'_>, elem: &TypeRef) -> bool {
    let active = engine.is_active(elem);
    if active {
        debug!("{} is already under construction, leaving the container empty", elem.blue());
    }
    active
}

fn produce(
    engine: &mut Engine<'_>,
    ty: &TypeRef,
    provider: Option<&ProviderRef>,
    hints: &[FieldAttribute],
) -> Result<Value, FixtureError> {
    match provider {
        Some(provider) => Ok(engine.provided(provider)),
        None => engine.site(ty, hints),
    }
}
