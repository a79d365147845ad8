//! Entry points over the validator and issue reporting.
//!
//! [`Schema::safe_parse`] is the primitive: it always returns a
//! [`ValidationResult`]. [`Schema::parse`] wraps it and turns a failure into
//! a [`ValidationError`] so callers can propagate it with `?`.
//!
//! For display, [`flatten`] groups messages by rendered path:
//!
//! ```rust
//! use zodiac::prelude::*;
//!
//! let form: Schema = zodiac::object()
//!     .field("name", zodiac::string().min(2).message("Name is too short"))
//!     .field("email", zodiac::email())
//!     .into();
//!
//! let result = form.safe_parse_json(&serde_json::json!({"name": "a", "email": "bad"}));
//! let errors = result.flatten();
//! assert_eq!(errors.field("name"), ["Name is too short"]);
//! assert_eq!(errors.field("email"), ["Invalid email"]);
//! assert!(errors.form_errors.is_empty());
//! ```

use crate::engine;
use crate::error::ValidationError;
use crate::issue::{Issue, Path, PathSegment};
use crate::options::ParseOptions;
use crate::schema::Schema;
use crate::value::Value;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_path_to_error::Segment;
use tracing::{debug, trace};

// =============================================================================
// Validation Result
// =============================================================================

/// Outcome of one validation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationResult {
    /// The input conformed; `value` is the output after coercion, defaults
    /// and unknown-key handling.
    Success {
        /// The validated output
        value: Value,
    },
    /// The input did not conform.
    Failure {
        /// Every issue, in the order found (never empty)
        issues: Vec<Issue>,
    },
}

impl ValidationResult {
    /// Returns true on success.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns true on failure.
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// The output value, if validation succeeded.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Success { value } => Some(value),
            Self::Failure { .. } => None,
        }
    }

    /// The issues; empty on success.
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Success { .. } => &[],
            Self::Failure { issues } => issues,
        }
    }

    /// Convert into a `Result`.
    pub fn into_result(self) -> Result<Value, ValidationError> {
        match self {
            Self::Success { value } => Ok(value),
            Self::Failure { issues } => Err(ValidationError::new(issues)),
        }
    }

    /// Group messages by field path. Empty on success.
    pub fn flatten(&self) -> FlattenedErrors {
        flatten(self.issues())
    }
}

// =============================================================================
// Entry Points
// =============================================================================

impl Schema {
    /// Validate `input` and return the result without failing.
    pub fn safe_parse(&self, input: &Value) -> ValidationResult {
        self.safe_parse_with(input, &ParseOptions::default())
    }

    /// [`Schema::safe_parse`] with explicit options.
    pub fn safe_parse_with(&self, input: &Value, options: &ParseOptions) -> ValidationResult {
        match engine::run(self, input, options) {
            Ok(value) => {
                trace!("Validation succeeded");
                ValidationResult::Success { value }
            }
            Err(issues) => {
                debug!(
                    issue_count = issues.len(),
                    paths = %render_paths(&issues),
                    "Validation failed"
                );
                ValidationResult::Failure { issues }
            }
        }
    }

    /// Validate `input`, returning the output or a [`ValidationError`]
    /// carrying every issue.
    pub fn parse(&self, input: &Value) -> Result<Value, ValidationError> {
        self.safe_parse(input).into_result()
    }

    /// [`Schema::parse`] with explicit options.
    pub fn parse_with(&self, input: &Value, options: &ParseOptions) -> Result<Value, ValidationError> {
        self.safe_parse_with(input, options).into_result()
    }

    /// [`Schema::safe_parse`] for a JSON document.
    pub fn safe_parse_json(&self, input: &serde_json::Value) -> ValidationResult {
        self.safe_parse(&Value::from(input))
    }

    /// [`Schema::parse`] for a JSON document.
    pub fn parse_json(&self, input: &serde_json::Value) -> Result<serde_json::Value, ValidationError> {
        self.parse(&Value::from(input)).map(|value| value.to_json())
    }

    /// Validate `input`, then deserialize the output into `T`.
    ///
    /// A deserialization failure becomes a single `custom` issue at the
    /// path where deserialization stopped.
    ///
    /// ```rust
    /// use serde::Deserialize;
    /// use zodiac::prelude::*;
    ///
    /// #[derive(Deserialize)]
    /// struct Settings {
    ///     theme: String,
    ///     port: u16,
    /// }
    ///
    /// let schema: Schema = zodiac::object()
    ///     .field("theme", zodiac::string().default("light"))
    ///     .field("port", zodiac::coerce::number().int())
    ///     .into();
    ///
    /// let settings: Settings = schema
    ///     .parse_as(&Value::from(serde_json::json!({"port": "8080"})))
    ///     .unwrap();
    /// assert_eq!(settings.theme, "light");
    /// assert_eq!(settings.port, 8080);
    /// ```
    pub fn parse_as<T: DeserializeOwned>(&self, input: &Value) -> Result<T, ValidationError> {
        let output = self.parse(input)?;
        serde_path_to_error::deserialize::<_, T>(output.to_json()).map_err(|err| {
            let path: Path = err
                .path()
                .iter()
                .filter_map(|segment| match segment {
                    Segment::Seq { index } => Some(PathSegment::Index(*index)),
                    Segment::Map { key } => Some(PathSegment::Key(key.clone())),
                    Segment::Enum { variant } => Some(PathSegment::Key(variant.clone())),
                    _ => None,
                })
                .collect();
            debug!(path = %path, "Validated output did not deserialize");
            ValidationError::new(vec![Issue::custom(err.into_inner().to_string()).at(path)])
        })
    }
}

fn render_paths(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| issue.path.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// =============================================================================
// Flattening
// =============================================================================

/// Issue messages grouped for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedErrors {
    /// Messages of issues at the root path
    pub form_errors: Vec<String>,
    /// Messages keyed by rendered path (`address.city`, `tags[0]`), in the
    /// order the paths first appeared
    pub field_errors: IndexMap<String, Vec<String>>,
}

impl FlattenedErrors {
    /// Returns true when there are no messages at all.
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    /// All messages for one rendered path.
    pub fn field(&self, path: &str) -> &[String] {
        self.field_errors.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The first message for one rendered path.
    pub fn first(&self, path: &str) -> Option<&str> {
        self.field(path).first().map(String::as_str)
    }
}

/// Group issue messages by rendered path, keeping every message and the
/// order in which they were found.
pub fn flatten(issues: &[Issue]) -> FlattenedErrors {
    let mut flattened = FlattenedErrors::default();
    for issue in issues {
        if issue.path.is_root() {
            flattened.form_errors.push(issue.message.clone());
        } else {
            flattened
                .field_errors
                .entry(issue.path.to_string())
                .or_default()
                .push(issue.message.clone());
        }
    }
    flattened
}
