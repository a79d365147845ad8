use super::checks::{Bounds, Refinement, set_last_message};
use super::{Node, Schema, freeze};
use crate::coerce::Coercion;
use crate::error::{SchemaError, invalid_schema};

const SUBJECT: &str = "number";

/// Whether fractional values pass the type check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum NumberKind {
    #[default]
    Float,
    Integer,
}

#[derive(Debug, Clone)]
pub(crate) enum NumberCheck {
    Gte(f64),
    Gt(f64),
    Lte(f64),
    Lt(f64),
    Int,
    Finite,
    MultipleOf(f64),
}

/// Builder for number schemas.
///
/// NaN never passes the type check. [`NumberSchema::int`] is a refinement
/// reported as `invalid_format`, while the crate-level
/// [`int()`](crate::int) constructor makes integrality part of the type.
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    pub(crate) kind: NumberKind,
    pub(crate) checks: Vec<Refinement<NumberCheck>>,
    pub(crate) type_message: Option<String>,
    bounds: Bounds<f64>,
    coercion: Option<Coercion>,
}

impl NumberSchema {
    /// Create a number schema without refinements.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Create a schema whose type check only admits whole numbers.
    pub fn integer() -> Self {
        Self {
            kind: NumberKind::Integer,
            ..Self::new()
        }
    }

    fn push(mut self, check: NumberCheck) -> Self {
        self.checks.push(Refinement::new(check));
        self
    }

    fn lower(mut self, value: f64, inclusive: bool) -> Self {
        self.bounds = self
            .bounds
            .with_lower(value, inclusive, SUBJECT)
            .unwrap_or_else(|e| invalid_schema(e));
        self
    }

    fn upper(mut self, value: f64, inclusive: bool) -> Self {
        self.bounds = self
            .bounds
            .with_upper(value, inclusive, SUBJECT)
            .unwrap_or_else(|e| invalid_schema(e));
        self
    }

    /// Greater than or equal to `value`.
    ///
    /// # Panics
    ///
    /// Panics when the bound contradicts an upper bound declared earlier.
    pub fn min(self, value: impl Into<f64>) -> Self {
        self.gte(value)
    }

    /// Less than or equal to `value`.
    ///
    /// # Panics
    ///
    /// Panics when the bound contradicts a lower bound declared earlier.
    pub fn max(self, value: impl Into<f64>) -> Self {
        self.lte(value)
    }

    /// Greater than or equal to `value`.
    pub fn gte(self, value: impl Into<f64>) -> Self {
        let value = value.into();
        self.lower(value, true).push(NumberCheck::Gte(value))
    }

    /// Strictly greater than `value`.
    pub fn gt(self, value: impl Into<f64>) -> Self {
        let value = value.into();
        self.lower(value, false).push(NumberCheck::Gt(value))
    }

    /// Less than or equal to `value`.
    pub fn lte(self, value: impl Into<f64>) -> Self {
        let value = value.into();
        self.upper(value, true).push(NumberCheck::Lte(value))
    }

    /// Strictly less than `value`.
    pub fn lt(self, value: impl Into<f64>) -> Self {
        let value = value.into();
        self.upper(value, false).push(NumberCheck::Lt(value))
    }

    /// Greater than zero.
    pub fn positive(self) -> Self {
        self.gt(0.0)
    }

    /// Less than zero.
    pub fn negative(self) -> Self {
        self.lt(0.0)
    }

    /// Zero or greater.
    pub fn nonnegative(self) -> Self {
        self.gte(0.0)
    }

    /// Zero or less.
    pub fn nonpositive(self) -> Self {
        self.lte(0.0)
    }

    /// A whole number.
    pub fn int(self) -> Self {
        self.push(NumberCheck::Int)
    }

    /// Not infinite.
    pub fn finite(self) -> Self {
        self.push(NumberCheck::Finite)
    }

    /// An integer multiple of `step`.
    ///
    /// # Panics
    ///
    /// Panics when `step` is not a positive finite number.
    pub fn multiple_of(self, step: impl Into<f64>) -> Self {
        let step = step.into();
        if !(step.is_finite() && step > 0.0) {
            invalid_schema(SchemaError::InvalidStep(step));
        }
        self.push(NumberCheck::MultipleOf(step))
    }

    /// Message for the most recently added refinement. Without any
    /// refinement it sets the type-mismatch message instead.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(message) = set_last_message(&mut self.checks, message.into()) {
            self.type_message = Some(message);
        }
        self
    }

    /// Message used when the value is not a number.
    pub fn type_message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }

    pub(crate) fn with_coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = Some(coercion);
        self
    }
}

impl From<NumberSchema> for Schema {
    fn from(mut builder: NumberSchema) -> Self {
        let coercion = builder.coercion.take();
        freeze(Node::Number(builder), coercion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_age_schema_builds() {
        let schema = NumberSchema::new().int().positive().min(13).max(120);
        assert_eq!(schema.checks.len(), 4);
    }

    #[test]
    #[should_panic(expected = "inverted bounds on number")]
    fn positive_with_negative_max_panics() {
        let _ = NumberSchema::new().positive().max(-1);
    }

    #[test]
    #[should_panic(expected = "multiple_of step")]
    fn zero_step_panics() {
        let _ = NumberSchema::new().multiple_of(0);
    }

    #[test]
    fn integer_kind() {
        assert_eq!(NumberSchema::integer().kind, NumberKind::Integer);
        assert_eq!(NumberSchema::new().kind, NumberKind::Float);
    }
}
