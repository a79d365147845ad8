//! Pre-validation transforms.
//!
//! A [`Coercion`] turns a raw input into the shape its schema expects
//! (typically a form string into a number) before any type check runs.
//! Returning `None` means the input cannot be coerced; the engine then
//! reports a `type_mismatch` issue.
//!
//! The constructors in this module mirror the primitive constructors of the
//! crate root but accept loosely typed input:
//!
//! ```rust
//! use zodiac::{Value, coerce};
//!
//! let age = zodiac::Schema::from(coerce::number().int().min(13.0));
//! assert_eq!(age.parse(&Value::from("42")).unwrap(), Value::Number(42.0));
//! ```

use crate::schema::{BooleanSchema, DateSchema, NumberSchema, StringSchema};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::sync::Arc;

type CoerceFn = dyn Fn(&Value) -> Option<Value> + Send + Sync;

/// A named, pure transform applied to raw input before validation.
#[derive(Clone)]
pub struct Coercion {
    name: &'static str,
    func: Arc<CoerceFn>,
}

impl Coercion {
    /// Wrap a transform. The function must be pure and must not panic.
    pub fn new<F>(name: &'static str, func: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            name,
            func: Arc::new(func),
        }
    }

    /// Name used in logs and debug output.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply the transform.
    pub fn apply(&self, value: &Value) -> Option<Value> {
        (self.func)(value)
    }

    /// Strings are parsed as decimal numbers, booleans become 1 or 0 and
    /// dates become epoch milliseconds.
    pub fn to_number() -> Self {
        Self::new("number", |value| match value {
            Value::Number(n) => Some(Value::Number(*n)),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(Value::Number)
            }
            Value::Bool(b) => Some(Value::Number(if *b { 1.0 } else { 0.0 })),
            Value::Date(d) => Some(Value::Number(d.timestamp_millis() as f64)),
            _ => None,
        })
    }

    /// Numbers, booleans and dates are rendered as strings.
    pub fn to_string() -> Self {
        Self::new("string", |value| match value {
            Value::String(s) => Some(Value::String(s.clone())),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            Value::Date(d) => Some(Value::String(d.to_rfc3339())),
            _ => None,
        })
    }

    /// Accepts `true/false`, `1/0`, `yes/no` and `on/off` (any case) and
    /// numbers, where zero is false.
    pub fn to_boolean() -> Self {
        Self::new("boolean", |value| match value {
            Value::Bool(b) => Some(Value::Bool(*b)),
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) => Some(Value::Bool(*n != 0.0)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Some(Value::Bool(true)),
                "false" | "0" | "no" | "off" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        })
    }

    /// Accepts RFC 3339 timestamps, `YYYY-MM-DD` dates (midnight UTC) and
    /// epoch milliseconds.
    pub fn to_date() -> Self {
        Self::new("date", |value| match value {
            Value::Date(d) => Some(Value::Date(*d)),
            Value::String(s) => parse_date(s.trim()).map(Value::Date),
            Value::Number(n) if n.is_finite() => {
                DateTime::from_timestamp_millis(*n as i64).map(Value::Date)
            }
            _ => None,
        })
    }
}

pub(crate) fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coercion").field("name", &self.name).finish()
    }
}

/// A number schema fed through [`Coercion::to_number`].
pub fn number() -> NumberSchema {
    NumberSchema::new().with_coercion(Coercion::to_number())
}

/// A string schema fed through [`Coercion::to_string`].
pub fn string() -> StringSchema {
    StringSchema::new().with_coercion(Coercion::to_string())
}

/// A boolean schema fed through [`Coercion::to_boolean`].
pub fn boolean() -> BooleanSchema {
    BooleanSchema::new().with_coercion(Coercion::to_boolean())
}

/// A date schema fed through [`Coercion::to_date`].
pub fn date() -> DateSchema {
    DateSchema::new().with_coercion(Coercion::to_date())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_coercion() {
        let c = Coercion::to_number();
        assert_eq!(c.apply(&Value::from(" 42 ")), Some(Value::Number(42.0)));
        assert_eq!(c.apply(&Value::from("4.5")), Some(Value::Number(4.5)));
        assert_eq!(c.apply(&Value::from(true)), Some(Value::Number(1.0)));
        assert_eq!(c.apply(&Value::from("")), None);
        assert_eq!(c.apply(&Value::from("abc")), None);
        assert_eq!(c.apply(&Value::from("inf")), None);
        assert_eq!(c.apply(&Value::Null), None);
    }

    #[test]
    fn boolean_coercion() {
        let c = Coercion::to_boolean();
        assert_eq!(c.apply(&Value::from("YES")), Some(Value::Bool(true)));
        assert_eq!(c.apply(&Value::from("off")), Some(Value::Bool(false)));
        assert_eq!(c.apply(&Value::from(0)), Some(Value::Bool(false)));
        assert_eq!(c.apply(&Value::from("maybe")), None);
    }

    #[test]
    fn string_coercion() {
        let c = Coercion::to_string();
        assert_eq!(c.apply(&Value::from(13)), Some(Value::from("13")));
        assert_eq!(c.apply(&Value::from(false)), Some(Value::from("false")));
        assert_eq!(c.apply(&Value::Null), None);
    }

    #[test]
    fn date_coercion() {
        let c = Coercion::to_date();
        let expected = parse_date("2025-01-01T00:00:00Z").unwrap();
        assert_eq!(c.apply(&Value::from("2025-01-01")), Some(Value::Date(expected)));
        assert_eq!(
            c.apply(&Value::Number(expected.timestamp_millis() as f64)),
            Some(Value::Date(expected))
        );
        assert_eq!(c.apply(&Value::from("not a date")), None);
    }
}
