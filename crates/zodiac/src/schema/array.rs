use super::checks::{Bounds, Refinement, set_last_message};
use super::{Node, Schema};
use crate::error::{SchemaError, invalid_schema};

const SUBJECT: &str = "array length";

#[derive(Debug, Clone)]
pub(crate) enum ArrayCheck {
    NonEmpty,
    Min(usize),
    Max(usize),
    Length(usize),
}

/// Builder for array schemas.
///
/// Size checks run before element validation; element issues carry the
/// element index in their path.
#[derive(Debug, Clone)]
pub struct ArraySchema {
    pub(crate) element: Schema,
    pub(crate) checks: Vec<Refinement<ArrayCheck>>,
    pub(crate) type_message: Option<String>,
    bounds: Bounds<usize>,
}

impl ArraySchema {
    /// Create an array schema whose elements must satisfy `element`.
    pub fn new(element: impl Into<Schema>) -> Self {
        Self {
            element: element.into(),
            checks: Vec::new(),
            type_message: None,
            bounds: Bounds::default(),
        }
    }

    fn bounded(
        mut self,
        check: ArrayCheck,
        update: impl FnOnce(Bounds<usize>) -> Result<Bounds<usize>, SchemaError>,
    ) -> Self {
        self.bounds = update(self.bounds).unwrap_or_else(|e| invalid_schema(e));
        self.checks.push(Refinement::new(check));
        self
    }

    /// At least one element. Checked before every other refinement.
    pub fn nonempty(mut self) -> Self {
        self.bounds = self
            .bounds
            .with_lower(1, true, SUBJECT)
            .unwrap_or_else(|e| invalid_schema(e));
        self.checks.push(Refinement::new(ArrayCheck::NonEmpty));
        self
    }

    /// At least `len` elements.
    pub fn min(self, len: usize) -> Self {
        self.bounded(ArrayCheck::Min(len), |b| b.with_lower(len, true, SUBJECT))
    }

    /// At most `len` elements.
    pub fn max(self, len: usize) -> Self {
        self.bounded(ArrayCheck::Max(len), |b| b.with_upper(len, true, SUBJECT))
    }

    /// Exactly `len` elements.
    pub fn length(self, len: usize) -> Self {
        self.bounded(ArrayCheck::Length(len), |b| {
            b.with_lower(len, true, SUBJECT)?.with_upper(len, true, SUBJECT)
        })
    }

    /// Message for the most recently added refinement. Without any
    /// refinement it sets the type-mismatch message instead.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(message) = set_last_message(&mut self.checks, message.into()) {
            self.type_message = Some(message);
        }
        self
    }

    /// Message used when the value is not an array.
    pub fn type_message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }
}

impl From<ArraySchema> for Schema {
    fn from(builder: ArraySchema) -> Self {
        Schema::from_node(Node::Array(builder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_follows_nonempty() {
        let schema = ArraySchema::new(Schema::unknown())
            .max(3)
            .nonempty()
            .message("need one");
        assert!(matches!(schema.checks[1].check, ArrayCheck::NonEmpty));
        assert_eq!(schema.checks[1].message.as_deref(), Some("need one"));
    }

    #[test]
    #[should_panic(expected = "inverted bounds on array length")]
    fn nonempty_with_zero_max_panics() {
        let _ = ArraySchema::new(Schema::unknown()).max(0).nonempty();
    }
}
