use super::checks::{Bounds, Refinement, set_last_message};
use super::{Node, Schema, freeze};
use crate::coerce::Coercion;
use crate::error::{SchemaError, invalid_schema};
use regex::Regex;

const SUBJECT: &str = "string length";

#[derive(Debug, Clone)]
pub(crate) enum StringCheck {
    Min(usize),
    Max(usize),
    Length(usize),
    Email,
    Url,
    Uuid,
    Regex(Regex),
    StartsWith(String),
    EndsWith(String),
    DateTime,
}

/// Builder for string schemas.
///
/// Refinements run in the order they are declared and every failing one is
/// reported. Lengths are counted in Unicode scalar values.
///
/// ```rust
/// use zodiac::prelude::*;
///
/// let username = zodiac::string().min(3).max(20).message("3 to 20 characters");
/// let schema = Schema::from(username);
/// assert!(schema.safe_parse(&Value::from("ab")).is_failure());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    pub(crate) checks: Vec<Refinement<StringCheck>>,
    pub(crate) type_message: Option<String>,
    bounds: Bounds<usize>,
    coercion: Option<Coercion>,
}

impl StringSchema {
    /// Create a string schema without refinements.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    fn push(mut self, check: StringCheck) -> Self {
        self.checks.push(Refinement::new(check));
        self
    }

    fn bounded(
        mut self,
        update: impl FnOnce(Bounds<usize>) -> Result<Bounds<usize>, SchemaError>,
    ) -> Self {
        self.bounds = update(self.bounds).unwrap_or_else(|e| invalid_schema(e));
        self
    }

    /// At least `len` characters.
    ///
    /// # Panics
    ///
    /// Panics when `len` exceeds a maximum declared earlier.
    pub fn min(self, len: usize) -> Self {
        self.bounded(|b| b.with_lower(len, true, SUBJECT))
            .push(StringCheck::Min(len))
    }

    /// At most `len` characters.
    ///
    /// # Panics
    ///
    /// Panics when `len` is below a minimum declared earlier.
    pub fn max(self, len: usize) -> Self {
        self.bounded(|b| b.with_upper(len, true, SUBJECT))
            .push(StringCheck::Max(len))
    }

    /// Exactly `len` characters.
    pub fn length(self, len: usize) -> Self {
        self.bounded(|b| b.with_lower(len, true, SUBJECT)?.with_upper(len, true, SUBJECT))
            .push(StringCheck::Length(len))
    }

    /// At least one character.
    pub fn nonempty(self) -> Self {
        self.min(1)
    }

    /// An email address.
    pub fn email(self) -> Self {
        self.push(StringCheck::Email)
    }

    /// An absolute URL with a scheme and a host.
    pub fn url(self) -> Self {
        self.push(StringCheck::Url)
    }

    /// A hyphenated UUID.
    pub fn uuid(self) -> Self {
        self.push(StringCheck::Uuid)
    }

    /// An RFC 3339 timestamp.
    pub fn datetime(self) -> Self {
        self.push(StringCheck::DateTime)
    }

    /// Must start with `prefix`.
    pub fn starts_with(self, prefix: impl Into<String>) -> Self {
        self.push(StringCheck::StartsWith(prefix.into()))
    }

    /// Must end with `suffix`.
    pub fn ends_with(self, suffix: impl Into<String>) -> Self {
        self.push(StringCheck::EndsWith(suffix.into()))
    }

    /// Must match `pattern`.
    ///
    /// # Panics
    ///
    /// Panics when `pattern` does not compile.
    pub fn regex(self, pattern: &str) -> Self {
        self.try_regex(pattern).unwrap_or_else(|e| invalid_schema(e))
    }

    /// Fallible form of [`StringSchema::regex`].
    pub fn try_regex(self, pattern: &str) -> Result<Self, SchemaError> {
        let re = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.push(StringCheck::Regex(re)))
    }

    /// Message for the most recently added refinement. Without any
    /// refinement it sets the type-mismatch message instead.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(message) = set_last_message(&mut self.checks, message.into()) {
            self.type_message = Some(message);
        }
        self
    }

    /// Message used when the value is not a string.
    pub fn type_message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }

    pub(crate) fn with_coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = Some(coercion);
        self
    }
}

impl From<StringSchema> for Schema {
    fn from(mut builder: StringSchema) -> Self {
        let coercion = builder.coercion.take();
        freeze(Node::String(builder), coercion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refinements_keep_declaration_order() {
        let schema = StringSchema::new().min(2).email().max(10);
        let kinds: Vec<_> = schema
            .checks
            .iter()
            .map(|r| std::mem::discriminant(&r.check))
            .collect();
        assert_eq!(kinds.len(), 3);
        assert_eq!(kinds[0], std::mem::discriminant(&StringCheck::Min(0)));
        assert_eq!(kinds[1], std::mem::discriminant(&StringCheck::Email));
    }

    #[test]
    fn message_targets_last_refinement() {
        let schema = StringSchema::new().min(2).message("too short").max(5);
        assert_eq!(schema.checks[0].message.as_deref(), Some("too short"));
        assert_eq!(schema.checks[1].message, None);
    }

    #[test]
    fn message_without_refinement_sets_type_message() {
        let schema = StringSchema::new().message("must be text");
        assert_eq!(schema.type_message.as_deref(), Some("must be text"));
    }

    #[test]
    #[should_panic(expected = "inverted bounds on string length")]
    fn inverted_length_panics() {
        let _ = StringSchema::new().min(5).max(3);
    }

    #[test]
    fn invalid_regex_is_reported() {
        let err = StringSchema::new().try_regex("(").unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }
}
