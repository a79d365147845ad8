use super::checks::{Bounds, Refinement, set_last_message};
use super::{Node, Schema, freeze};
use crate::coerce::Coercion;
use crate::error::invalid_schema;
use chrono::{DateTime, Utc};

const SUBJECT: &str = "date";

#[derive(Debug, Clone)]
pub(crate) enum DateCheck {
    Min(DateTime<Utc>),
    Max(DateTime<Utc>),
}

/// Builder for date schemas.
///
/// Only [`Value::Date`](crate::Value::Date) passes the type check; use
/// [`coerce::date`](crate::coerce::date) to accept strings or timestamps.
#[derive(Debug, Clone, Default)]
pub struct DateSchema {
    pub(crate) checks: Vec<Refinement<DateCheck>>,
    pub(crate) type_message: Option<String>,
    bounds: Bounds<DateTime<Utc>>,
    coercion: Option<Coercion>,
}

impl DateSchema {
    /// Create a date schema without refinements.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// On or after `date`.
    ///
    /// # Panics
    ///
    /// Panics when `date` is after a maximum declared earlier.
    pub fn min(mut self, date: DateTime<Utc>) -> Self {
        self.bounds = self
            .bounds
            .with_lower(date, true, SUBJECT)
            .unwrap_or_else(|e| invalid_schema(e));
        self.checks.push(Refinement::new(DateCheck::Min(date)));
        self
    }

    /// On or before `date`.
    ///
    /// # Panics
    ///
    /// Panics when `date` is before a minimum declared earlier.
    pub fn max(mut self, date: DateTime<Utc>) -> Self {
        self.bounds = self
            .bounds
            .with_upper(date, true, SUBJECT)
            .unwrap_or_else(|e| invalid_schema(e));
        self.checks.push(Refinement::new(DateCheck::Max(date)));
        self
    }

    /// Message for the most recently added refinement. Without any
    /// refinement it sets the type-mismatch message instead.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(message) = set_last_message(&mut self.checks, message.into()) {
            self.type_message = Some(message);
        }
        self
    }

    /// Message used when the value is not a date.
    pub fn type_message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }

    pub(crate) fn with_coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = Some(coercion);
        self
    }
}

impl From<DateSchema> for Schema {
    fn from(mut builder: DateSchema) -> Self {
        let coercion = builder.coercion.take();
        freeze(Node::Date(builder), coercion)
    }
}
