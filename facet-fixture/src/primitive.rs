use core::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use num_bigint::{BigInt, RandBigInt};
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};

use crate::strategy::{Constraints, MAX_PATTERN_REPEAT, NumericRange};
use crate::types::{ScalarKind, TypeRef};
use crate::{FixtureError, FixtureErrorKind, Value};

/// Days from 1970-01-01 through 2100-12-31
const DATE_SPAN_DAYS: u64 = 47_847;

const SECONDS_PER_DAY: u32 = 86_400;

const MIN_DECIMAL_SCALE: i64 = 2;

/// Produces scalar values, honoring [`Constraints`].
///
/// Without constraints, integers fall in `1..=MAX` of their type, floats in
/// `[1, 1_000_000)`, strings are alphanumeric and dates fall between 1970
/// and 2100.
#[derive(Clone, Copy, Debug)]
pub struct PrimitiveGenerator {
    string_length: usize,
}

impl PrimitiveGenerator {
    /// A generator producing strings of `string_length` characters by
    /// default.
    pub fn new(string_length: usize) -> Self {
        Self { string_length }
    }

    /// Generates one value of `kind`.
    ///
    /// Constraints that do not apply to `kind` are ignored; a pattern that
    /// does not compile fails with
    /// [`FixtureErrorKind::InvalidAnnotationValue`].
    pub fn generate(
        &self,
        kind: ScalarKind,
        constraints: &Constraints,
        rng: &mut dyn RngCore,
    ) -> Result<Value, FixtureError> {
        if let Some((lo, hi)) = kind.integer_bounds() {
            let (min, max) = match constraints.range {
                Some(NumericRange::Int { min, max }) => (min.max(lo), max.min(hi)),
                _ => (1, hi),
            };
            let n = if min >= max {
                min
            } else {
                rng.gen_range(min..=max)
            };
            return Ok(integer(kind, n));
        }

        let value = match kind {
            ScalarKind::Bool => Value::Bool(rng.gen_bool(0.5)),
            ScalarKind::F32 => Value::F32(float(constraints, rng) as f32),
            ScalarKind::F64 => Value::F64(float(constraints, rng)),
            ScalarKind::Char => Value::Char(char::from(rng.sample(Alphanumeric))),
            ScalarKind::String => Value::String(self.string(constraints, rng)?),
            ScalarKind::BigInt => {
                let n = match constraints.range {
                    Some(NumericRange::Int { min, max }) if min < max => rng.gen_range(min..=max),
                    Some(NumericRange::Int { min, .. }) => min,
                    _ => rng.gen_range(1..=i128::from(i64::MAX)),
                };
                Value::BigInt(BigInt::from(n))
            }
            ScalarKind::BigDecimal => Value::BigDecimal(decimal(constraints, rng)),
            ScalarKind::Date => Value::Date(date(rng)),
            ScalarKind::Time => Value::Time(time(rng)),
            ScalarKind::DateTime => {
                let secs = rng.gen_range(0..DATE_SPAN_DAYS * u64::from(SECONDS_PER_DAY));
                let secs = i64::try_from(secs).unwrap_or_default();
                Value::DateTime(DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default())
            }
            ScalarKind::Uuid => {
                let mut bytes = [0u8; 16];
                rng.fill_bytes(&mut bytes);
                Value::Uuid(uuid::Builder::from_random_bytes(bytes).into_uuid())
            }
            // integer kinds are handled above
            _ => Value::Null,
        };
        Ok(value)
    }

    fn string(&self, constraints: &Constraints, rng: &mut dyn RngCore) -> Result<String, FixtureError> {
        if let Some(pattern) = &constraints.pattern {
            let regex = rand_regex::Regex::compile(pattern, MAX_PATTERN_REPEAT).map_err(|e| {
                FixtureError::from(FixtureErrorKind::InvalidAnnotationValue {
                    target: TypeRef::named(ScalarKind::String.type_identifier()),
                    literal: pattern.clone(),
                    reason: e.to_string(),
                })
            })?;
            return Ok(rng.sample::<String, _>(&regex));
        }

        let length = constraints.length.unwrap_or(self.string_length);
        Ok((0..length)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect())
    }
}

fn integer(kind: ScalarKind, n: i128) -> Value {
    // `n` is within the bounds of `kind`
    match kind {
        ScalarKind::I8 => Value::I8(n as i8),
        ScalarKind::I16 => Value::I16(n as i16),
        ScalarKind::I32 => Value::I32(n as i32),
        ScalarKind::I64 => Value::I64(n as i64),
        ScalarKind::U8 => Value::U8(n as u8),
        ScalarKind::U16 => Value::U16(n as u16),
        ScalarKind::U32 => Value::U32(n as u32),
        ScalarKind::U64 => Value::U64(n as u64),
        _ => Value::Null,
    }
}

fn float(constraints: &Constraints, rng: &mut dyn RngCore) -> f64 {
    match constraints.range {
        Some(NumericRange::Float { min, max }) if min < max => {
            // stays finite even when `max - min` overflows
            let t: f64 = rng.gen_range(0.0..=1.0);
            (min * (1.0 - t) + max * t).clamp(min, max)
        }
        Some(NumericRange::Float { min, .. }) => min,
        _ => rng.gen_range(1.0..1_000_000.0),
    }
}

/// At least two decimal places, more when a bound needs them. Both bounds
/// can be produced.
fn decimal(constraints: &Constraints, rng: &mut dyn RngCore) -> BigDecimal {
    let (min, max) = match constraints.range {
        Some(NumericRange::Float { min, max }) => (min, max),
        _ => (1.0, 1_000_000.0),
    };
    // the shortest decimal rendering, not the exact binary expansion
    let bound = |v: f64| {
        BigDecimal::from_str(&v.to_string()).unwrap_or_else(|_| BigDecimal::from(0i64))
    };
    let (min, max) = (bound(min), bound(max));

    let scale = MIN_DECIMAL_SCALE
        .max(min.as_bigint_and_exponent().1)
        .max(max.as_bigint_and_exponent().1);
    let (lo, _) = min.with_scale(scale).into_bigint_and_exponent();
    let (hi, _) = max.with_scale(scale).into_bigint_and_exponent();
    let units = if lo >= hi {
        lo
    } else {
        rng.gen_bigint_range(&lo, &(hi + 1u8))
    };
    BigDecimal::new(units, scale)
}

fn date(rng: &mut dyn RngCore) -> NaiveDate {
    let epoch = NaiveDate::default();
    epoch
        .checked_add_days(Days::new(rng.gen_range(0..DATE_SPAN_DAYS)))
        .unwrap_or(epoch)
}

fn time(rng: &mut dyn RngCore) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(rng.gen_range(0..SECONDS_PER_DAY), 0)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn integers_default_to_positive_values() {
        let generator = PrimitiveGenerator::new(10);
        let mut rng = rng();
        for &kind in ScalarKind::ALL.iter().filter(|k| k.integer_bounds().is_some()) {
            for _ in 0..200 {
                let value = generator.generate(kind, &Constraints::none(), &mut rng).unwrap();
                match value {
                    Value::U64(v) => assert!(v >= 1),
                    other => assert!(other.as_i64().unwrap() >= 1, "{kind}: {other}"),
                }
            }
        }
    }

    #[test]
    fn honors_integer_ranges() {
        let generator = PrimitiveGenerator::new(10);
        let mut rng = rng();
        let constraints = Constraints::none().with_range(NumericRange::Int { min: -3, max: 3 });
        for _ in 0..200 {
            let value = generator.generate(ScalarKind::I8, &constraints, &mut rng).unwrap();
            let Value::I8(v) = value else {
                panic!("expected an i8, got {value}");
            };
            assert!((-3..=3).contains(&v));
        }

        let pinned = Constraints::none().with_range(NumericRange::Int { min: 9, max: 9 });
        assert_eq!(
            generator.generate(ScalarKind::U16, &pinned, &mut rng).unwrap(),
            Value::U16(9)
        );
    }

    #[test]
    fn honors_float_ranges() {
        let generator = PrimitiveGenerator::new(10);
        let mut rng = rng();
        let constraints = Constraints::none().with_range(NumericRange::Float { min: 0.5, max: 0.75 });
        for _ in 0..200 {
            let v = generator
                .generate(ScalarKind::F64, &constraints, &mut rng)
                .unwrap()
                .as_f64()
                .unwrap();
            assert!((0.5..=0.75).contains(&v));
        }
        for _ in 0..200 {
            let v = generator
                .generate(ScalarKind::F32, &Constraints::none(), &mut rng)
                .unwrap()
                .as_f64()
                .unwrap();
            assert!((1.0..=1_000_000.0).contains(&v));
        }
    }

    #[test]
    fn wide_float_ranges_stay_finite() {
        let generator = PrimitiveGenerator::new(10);
        let mut rng = rng();
        for (min, max) in [(-1e308, 1e308), (-f64::MAX, f64::MAX), (1e308, f64::MAX)] {
            let constraints = Constraints::none().with_range(NumericRange::Float { min, max });
            for _ in 0..200 {
                let v = generator
                    .generate(ScalarKind::F64, &constraints, &mut rng)
                    .unwrap()
                    .as_f64()
                    .unwrap();
                assert!(v.is_finite() && (min..=max).contains(&v), "{v}");
            }
        }

        let near_max = Constraints::none().with_range(NumericRange::Float {
            min: 3e38,
            max: f64::from(f32::MAX),
        });
        for _ in 0..200 {
            let value = generator.generate(ScalarKind::F32, &near_max, &mut rng).unwrap();
            let Value::F32(v) = value else {
                panic!("expected an f32, got {value}");
            };
            assert!(v.is_finite() && v >= 3e38, "{v}");
        }
    }

    #[test]
    fn decimal_ranges_follow_their_bounds() {
        let generator = PrimitiveGenerator::new(10);
        let mut rng = rng();
        let decimal = |s: &str| s.parse::<BigDecimal>().unwrap();

        let narrow = Constraints::none().with_range(NumericRange::Float { min: 0.001, max: 0.009 });
        let mut seen = Vec::new();
        for _ in 0..500 {
            let Value::BigDecimal(d) = generator
                .generate(ScalarKind::BigDecimal, &narrow, &mut rng)
                .unwrap()
            else {
                panic!("expected a decimal");
            };
            assert!(decimal("0.001") <= d && d <= decimal("0.009"), "{d}");
            seen.push(d);
        }
        // inclusive at both ends
        assert!(seen.contains(&decimal("0.001")));
        assert!(seen.contains(&decimal("0.009")));

        let pinned = Constraints::none().with_range(NumericRange::Float { min: 2.5, max: 2.5 });
        assert_eq!(
            generator.generate(ScalarKind::BigDecimal, &pinned, &mut rng).unwrap(),
            Value::BigDecimal(decimal("2.50"))
        );

        let Value::BigDecimal(d) = generator
            .generate(ScalarKind::BigDecimal, &Constraints::none(), &mut rng)
            .unwrap()
        else {
            panic!("expected a decimal");
        };
        assert_eq!(d.as_bigint_and_exponent().1, 2);
        assert!(decimal("1") <= d && d <= decimal("1000000"), "{d}");
    }

    #[test]
    fn strings_follow_length_and_pattern() {
        let generator = PrimitiveGenerator::new(12);
        let mut rng = rng();

        let value = generator
            .generate(ScalarKind::String, &Constraints::none(), &mut rng)
            .unwrap();
        let s = value.as_str().unwrap();
        assert_eq!(s.len(), 12);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));

        let value = generator
            .generate(ScalarKind::String, &Constraints::none().with_length(3), &mut rng)
            .unwrap();
        assert_eq!(value.as_str().unwrap().len(), 3);

        let re = regex::Regex::new("^[A-Z]{3}-[0-9]{4}$").unwrap();
        for _ in 0..50 {
            let value = generator
                .generate(
                    ScalarKind::String,
                    &Constraints::none().with_pattern("[A-Z]{3}-[0-9]{4}"),
                    &mut rng,
                )
                .unwrap();
            assert!(re.is_match(value.as_str().unwrap()), "{value}");
        }
    }

    #[test]
    fn temporal_values_stay_in_range() {
        let generator = PrimitiveGenerator::new(10);
        let mut rng = rng();
        let first = NaiveDate::default();
        let last = "2100-12-31".parse::<NaiveDate>().unwrap();
        for _ in 0..200 {
            let Value::Date(d) = generator
                .generate(ScalarKind::Date, &Constraints::none(), &mut rng)
                .unwrap()
            else {
                panic!("expected a date");
            };
            assert!(first <= d && d <= last, "{d}");
        }
        let Value::DateTime(ts) = generator
            .generate(ScalarKind::DateTime, &Constraints::none(), &mut rng)
            .unwrap()
        else {
            panic!("expected a timestamp");
        };
        assert!(ts.date_naive() <= last);
    }

    #[test]
    fn same_seed_same_values() {
        let generator = PrimitiveGenerator::new(10);
        let kinds = [ScalarKind::Uuid, ScalarKind::BigDecimal, ScalarKind::String, ScalarKind::Time];
        let run = || {
            let mut rng = rng();
            kinds
                .iter()
                .map(|&k| generator.generate(k, &Constraints::none(), &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
