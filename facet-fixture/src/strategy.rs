use alloc::sync::Arc;
use core::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use num_bigint::BigInt;
use rand::RngCore;
use uuid::Uuid;

use crate::introspect::{Introspector, View};
use crate::types::{FieldAttribute, ScalarKind, TypeRef};
use crate::{FixtureError, FixtureErrorKind, Value};

/// A source of values registered under a string key in the
/// [`crate::ShapeRegistry`], and referenced from strategy attributes.
pub trait ValueProvider: Send + Sync {
    /// The type of every value this provider produces.
    fn output(&self) -> TypeRef;

    /// Produces one value.
    fn generate(&self, rng: &mut dyn RngCore) -> Value;
}

/// A [`ValueProvider`] backed by a closure, see [`from_fn`].
pub struct FnProvider<F> {
    output: TypeRef,
    f: F,
}

/// A provider producing values of type `output` by calling `f`.
pub fn from_fn<F>(output: TypeRef, f: F) -> FnProvider<F>
where
    F: Fn(&mut dyn RngCore) -> Value + Send + Sync,
{
    FnProvider { output, f }
}

impl<F> ValueProvider for FnProvider<F>
where
    F: Fn(&mut dyn RngCore) -> Value + Send + Sync,
{
    fn output(&self) -> TypeRef {
        self.output.clone()
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Value {
        (self.f)(rng)
    }
}

/// A registered provider, along with the key it was found under.
#[derive(Clone)]
pub struct ProviderRef {
    /// Registry key
    pub key: String,
    /// The provider itself
    pub provider: Arc<dyn ValueProvider>,
}

impl core::fmt::Debug for ProviderRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("ProviderRef").field(&self.key).finish()
    }
}

impl PartialEq for ProviderRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

/// Inclusive numeric bounds, validated against the site's type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumericRange {
    /// Integer kinds and `BigInt`
    Int {
        /// Lower bound
        min: i128,
        /// Upper bound
        max: i128,
    },
    /// Float kinds and `BigDecimal`
    Float {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
}

/// Structural hints passed on to generation.
#[derive(Clone, Debug, Default, PartialEq)]
#[non_exhaustive]
pub struct Constraints {
    /// Inclusive numeric range
    pub range: Option<NumericRange>,
    /// Exact string length
    pub length: Option<usize>,
    /// Regex that generated strings match
    pub pattern: Option<String>,
    /// Number of container entries
    pub size: Option<usize>,
    /// Provider for every container element, or every map value
    pub element: Option<ProviderRef>,
    /// Provider for every map key
    pub key: Option<ProviderRef>,
}

impl Constraints {
    /// No hints at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Sets [`Constraints::range`].
    pub fn with_range(mut self, range: NumericRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Sets [`Constraints::length`].
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets [`Constraints::pattern`].
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }
}

/// How the value at one construction site is obtained.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueStrategy {
    /// A fixed value, already converted to the site's type
    Literal(Value),
    /// A registered provider
    External(ProviderRef),
    /// Default generation, steered by hints
    Default(Constraints),
}

/// Upper bound on repetitions for unbounded pattern operators (`*`, `+`)
pub const MAX_PATTERN_REPEAT: u32 = 16;

/// Picks the strategy for one construction site of type `ty` carrying
/// `attributes`.
///
/// A literal wins over everything; the hints of a site with a literal are
/// not applied, nor validated. A field strategy comes next, then a
/// strategy attached to the type's shape, then the structural hints.
///
/// Range, length and pattern hints on a container are not resolved here:
/// the engine hands them down to the elements (map values), see
/// [`element_hints`].
pub fn resolve(
    introspector: &Introspector<'_>,
    ty: &TypeRef,
    attributes: &[FieldAttribute],
) -> Result<ValueStrategy, FixtureError> {
    let registry = introspector.registry();

    for attribute in attributes {
        if let FieldAttribute::Value(literal) = attribute {
            return convert_literal(introspector, ty, literal).map(ValueStrategy::Literal);
        }
    }

    for attribute in attributes {
        if let FieldAttribute::Strategy(key) = attribute {
            return checked_provider(introspector, key, ty).map(ValueStrategy::External);
        }
    }

    if let Some(key) = registry.shape_of(ty).and_then(|shape| shape.strategy_attr()) {
        return checked_provider(introspector, key, ty).map(ValueStrategy::External);
    }

    let has_hints = attributes.iter().any(|attr| {
        matches!(
            attr,
            FieldAttribute::Size(_)
                | FieldAttribute::Range { .. }
                | FieldAttribute::Length(_)
                | FieldAttribute::Pattern(_)
                | FieldAttribute::ElementStrategy(_)
                | FieldAttribute::KeyStrategy(_)
        )
    });
    if !has_hints {
        return Ok(ValueStrategy::Default(Constraints::none()));
    }

    let view = introspector.introspect_bound(ty)?.view;
    let view = peel(introspector, view)?;
    let mut constraints = Constraints::none();

    match &view {
        View::List { elem } | View::Set { elem } | View::Array { elem, .. } => {
            for attribute in attributes {
                match attribute {
                    FieldAttribute::Size(size) => constraints.size = Some(*size),
                    FieldAttribute::ElementStrategy(key) => {
                        constraints.element = Some(checked_provider(introspector, key, elem)?);
                    }
                    FieldAttribute::KeyStrategy(_) => {
                        return Err(invalid(ty, "key strategy", "only maps have keys"));
                    }
                    _ => {}
                }
            }
        }
        View::Map { key: key_ty, value } => {
            for attribute in attributes {
                match attribute {
                    FieldAttribute::Size(size) => constraints.size = Some(*size),
                    FieldAttribute::ElementStrategy(key) => {
                        constraints.element = Some(checked_provider(introspector, key, value)?);
                    }
                    FieldAttribute::KeyStrategy(key) => {
                        constraints.key = Some(checked_provider(introspector, key, key_ty)?);
                    }
                    _ => {}
                }
            }
        }
        View::Scalar(kind) => {
            for attribute in attributes {
                match attribute {
                    FieldAttribute::Range { min, max } => {
                        constraints.range =
                            Some(numeric_range(ty, *kind, min.as_deref(), max.as_deref())?);
                    }
                    FieldAttribute::Length(length) => {
                        if *kind != ScalarKind::String {
                            return Err(invalid(ty, &length.to_string(), "length applies to strings"));
                        }
                        constraints.length = Some(*length);
                    }
                    FieldAttribute::Pattern(pattern) => {
                        if *kind != ScalarKind::String {
                            return Err(invalid(ty, pattern, "patterns apply to strings"));
                        }
                        if let Err(e) = rand_regex::Regex::compile(pattern, MAX_PATTERN_REPEAT) {
                            return Err(invalid(ty, pattern, &e.to_string()));
                        }
                        constraints.pattern = Some(pattern.clone());
                    }
                    FieldAttribute::Size(size) => {
                        return Err(invalid(ty, &size.to_string(), "size applies to containers"));
                    }
                    FieldAttribute::ElementStrategy(key) | FieldAttribute::KeyStrategy(key) => {
                        return Err(invalid(ty, key, "element strategies apply to containers"));
                    }
                    _ => {}
                }
            }
        }
        _ => {
            return Err(invalid(
                ty,
                "",
                "structural hints apply to scalars and containers",
            ));
        }
    }

    Ok(ValueStrategy::Default(constraints))
}

/// The hints of a container site that apply to each element (map value)
/// rather than to the container.
pub fn element_hints(attributes: &[FieldAttribute]) -> Vec<FieldAttribute> {
    attributes
        .iter()
        .filter(|attr| {
            matches!(
                attr,
                FieldAttribute::Range { .. } | FieldAttribute::Length(_) | FieldAttribute::Pattern(_)
            )
        })
        .cloned()
        .collect()
}

/// Converts a literal to a value of the scalar or enumeration type `ty`.
/// Options and pointers convert to their inner type.
pub fn convert_literal(
    introspector: &Introspector<'_>,
    ty: &TypeRef,
    literal: &str,
) -> Result<Value, FixtureError> {
    let view = peel(introspector, introspector.introspect_bound(ty)?.view)?;
    match view {
        View::Scalar(kind) => parse_scalar(kind, literal)
            .ok_or_else(|| invalid(ty, literal, &format!("not a valid {kind}"))),
        View::Enum { type_name, constants } => {
            if constants.iter().any(|c| c == literal) {
                Ok(Value::Enum {
                    type_name,
                    constant: literal.to_string(),
                })
            } else {
                Err(invalid(ty, literal, "not a declared constant"))
            }
        }
        _ => Err(invalid(
            ty,
            literal,
            "literals apply to scalar and enumeration types",
        )),
    }
}

fn parse_scalar(kind: ScalarKind, s: &str) -> Option<Value> {
    let value = match kind {
        ScalarKind::Bool => Value::Bool(s.parse().ok()?),
        ScalarKind::I8 => Value::I8(s.parse().ok()?),
        ScalarKind::I16 => Value::I16(s.parse().ok()?),
        ScalarKind::I32 => Value::I32(s.parse().ok()?),
        ScalarKind::I64 => Value::I64(s.parse().ok()?),
        ScalarKind::U8 => Value::U8(s.parse().ok()?),
        ScalarKind::U16 => Value::U16(s.parse().ok()?),
        ScalarKind::U32 => Value::U32(s.parse().ok()?),
        ScalarKind::U64 => Value::U64(s.parse().ok()?),
        ScalarKind::F32 => Value::F32(s.parse().ok()?),
        ScalarKind::F64 => Value::F64(s.parse().ok()?),
        ScalarKind::Char => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => return None,
            }
        }
        ScalarKind::String => Value::String(s.to_string()),
        ScalarKind::BigInt => Value::BigInt(BigInt::from_str(s).ok()?),
        ScalarKind::BigDecimal => Value::BigDecimal(BigDecimal::from_str(s).ok()?),
        ScalarKind::Date => Value::Date(s.parse::<NaiveDate>().ok()?),
        ScalarKind::Time => Value::Time(s.parse::<NaiveTime>().ok()?),
        ScalarKind::DateTime => Value::DateTime(s.parse::<DateTime<Utc>>().ok()?),
        ScalarKind::Uuid => Value::Uuid(Uuid::parse_str(s).ok()?),
    };
    Some(value)
}

/// Validates range bounds against `kind`. Open bounds default to the
/// usual generation domain where possible.
fn numeric_range(
    ty: &TypeRef,
    kind: ScalarKind,
    min: Option<&str>,
    max: Option<&str>,
) -> Result<NumericRange, FixtureError> {
    let label = format!("{}..={}", min.unwrap_or(""), max.unwrap_or(""));

    let int_domain = match kind {
        ScalarKind::BigInt => Some((i128::MIN, i128::MAX)),
        other => other.integer_bounds(),
    };

    if let Some((lo, hi)) = int_domain {
        let parse = |bound: Option<&str>| -> Result<Option<i128>, FixtureError> {
            match bound {
                None => Ok(None),
                Some(s) => match s.trim().parse::<i128>() {
                    Ok(v) if (lo..=hi).contains(&v) => Ok(Some(v)),
                    Ok(_) => Err(invalid(ty, s, &format!("out of the {kind} domain"))),
                    Err(_) => Err(invalid(ty, s, "not an integer bound")),
                },
            }
        };
        let (min, max) = (parse(min)?, parse(max)?);
        let max = max.unwrap_or(hi);
        let min = min.unwrap_or(if max >= 1 { 1 } else { lo });
        if min > max {
            return Err(invalid(ty, &label, "minimum is greater than maximum"));
        }
        return Ok(NumericRange::Int { min, max });
    }

    if kind.is_float() || kind == ScalarKind::BigDecimal {
        let limit = if kind == ScalarKind::F32 {
            f64::from(f32::MAX)
        } else {
            f64::MAX
        };
        let parse = |bound: Option<&str>| -> Result<Option<f64>, FixtureError> {
            match bound {
                None => Ok(None),
                Some(s) => match s.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() && v.abs() <= limit => Ok(Some(v)),
                    Ok(_) => Err(invalid(ty, s, &format!("out of the {kind} domain"))),
                    Err(_) => Err(invalid(ty, s, "not a numeric bound")),
                },
            }
        };
        let (min, max) = (parse(min)?, parse(max)?);
        let (min, max) = match (min, max) {
            (Some(min), Some(max)) => (min, max),
            (Some(min), None) => (min, (min.max(1.0) * 2.0 + 1_000_000.0).min(limit)),
            (None, Some(max)) => {
                let min = if max >= 1.0 {
                    1.0
                } else {
                    (max - 1_000_000.0).max(-limit)
                };
                (min, max)
            }
            (None, None) => (1.0, 1_000_000.0),
        };
        if min > max {
            return Err(invalid(ty, &label, "minimum is greater than maximum"));
        }
        return Ok(NumericRange::Float { min, max });
    }

    Err(invalid(ty, &label, "ranges apply to numeric types"))
}

fn checked_provider(
    introspector: &Introspector<'_>,
    key: &str,
    expected: &TypeRef,
) -> Result<ProviderRef, FixtureError> {
    let registry = introspector.registry();
    let provider = registry
        .strategy(key)
        .ok_or_else(|| FixtureErrorKind::UnknownStrategy {
            key: key.to_string(),
        })?;
    let produces = provider.output();
    if !registry.is_assignable(&produces, expected) {
        return Err(FixtureErrorKind::StrategyTypeMismatch {
            key: key.to_string(),
            produces,
            expected: expected.clone(),
        }
        .into());
    }
    Ok(ProviderRef {
        key: key.to_string(),
        provider: provider.clone(),
    })
}

/// Options and pointers are transparent to annotations.
fn peel(introspector: &Introspector<'_>, mut view: View) -> Result<View, FixtureError> {
    while let View::Option { inner } | View::Pointer { inner } = view {
        view = introspector.introspect_bound(&inner)?.view;
    }
    Ok(view)
}

fn invalid(ty: &TypeRef, literal: &str, reason: &str) -> FixtureError {
    FixtureErrorKind::InvalidAnnotationValue {
        target: ty.clone(),
        literal: literal.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
