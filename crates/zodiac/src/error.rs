//! Error types.
//!
//! Two families of errors exist and they never mix:
//!
//! - [`ValidationError`] is bad *data*: the input did not satisfy a schema.
//!   It carries the complete issue list so callers can rebuild per-field
//!   messages from it.
//! - [`SchemaError`] is a bad *schema*: a builder call that can never be
//!   satisfied (inverted bounds, duplicate fields, ...). Builders panic with
//!   it immediately; the `try_*` builder variants return it instead.

use crate::issue::Issue;
use crate::report::{FlattenedErrors, flatten};
use crate::value::ValueKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input failed validation.
///
/// Returned by the throwing entry points ([`Schema::parse`](crate::Schema::parse)
/// and friends) so it can be propagated with `?`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("validation failed with {} issue(s): {}", .issues.len(), render(.issues))]
pub struct ValidationError {
    issues: Vec<Issue>,
}

impl ValidationError {
    /// Create an error from a list of issues.
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// The issues in the order they were found.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Consume the error and return its issues.
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }

    /// Group messages by field path.
    pub fn flatten(&self) -> FlattenedErrors {
        flatten(&self.issues)
    }
}

fn render(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(Issue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A schema was assembled in a way that can never validate anything.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// A lower bound exceeds an upper bound
    #[error("inverted bounds on {subject}: minimum {min} exceeds maximum {max}")]
    InvertedBounds {
        /// What the bounds constrain (e.g. "string length")
        subject: &'static str,
        /// The effective lower bound
        min: String,
        /// The effective upper bound
        max: String,
    },
    /// A bound that cannot be ordered (NaN)
    #[error("bound on {0} is not comparable")]
    IncomparableBound(&'static str),
    /// Two object fields share a name
    #[error("duplicate object field `{0}`")]
    DuplicateField(String),
    /// Two enum options share a value
    #[error("duplicate enum value `{0}`")]
    DuplicateEnumValue(String),
    /// An enum without options
    #[error("enum must declare at least one value")]
    EmptyEnum,
    /// A union without alternatives
    #[error("union must declare at least one alternative")]
    EmptyUnion,
    /// A regex that does not compile
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The rejected pattern
        pattern: String,
        /// Compiler message
        reason: String,
    },
    /// `multiple_of` with a step that is not a positive finite number
    #[error("multiple_of step must be positive and finite (got {0})")]
    InvalidStep(f64),
    /// A literal that is not a string, number, boolean or null
    #[error("literal values must be string, number, boolean or null (got {0})")]
    InvalidLiteral(ValueKind),
    /// A default that is itself absent
    #[error("default value must not be absent")]
    AbsentDefault,
    /// A client environment variable without the public prefix
    #[error("client variable `{name}` must start with `{prefix}`")]
    MissingClientPrefix {
        /// The declared variable name
        name: String,
        /// The required prefix
        prefix: String,
    },
}

/// Abort schema construction.
#[track_caller]
pub(crate) fn invalid_schema(error: SchemaError) -> ! {
    panic!("invalid schema: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{IssueCode, Path};

    #[test]
    fn display_lists_every_issue() {
        let error = ValidationError::new(vec![
            Issue::new(IssueCode::TooSmall, "too short").at(Path::root().join("name")),
            Issue::new(IssueCode::InvalidFormat, "Invalid email").at(Path::root().join("email")),
        ]);
        assert_eq!(
            error.to_string(),
            "validation failed with 2 issue(s): name: too short; email: Invalid email"
        );
    }

    #[test]
    fn schema_error_messages() {
        let error = SchemaError::InvertedBounds {
            subject: "number",
            min: "10".into(),
            max: "5".into(),
        };
        assert_eq!(error.to_string(), "inverted bounds on number: minimum 10 exceeds maximum 5");
        assert_eq!(
            SchemaError::DuplicateField("name".into()).to_string(),
            "duplicate object field `name`"
        );
    }
}
