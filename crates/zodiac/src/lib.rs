//! # zodiac
//!
//! Declarative schema validation for dynamically shaped input.
//!
//! Schemas are immutable trees assembled from small builders: primitives
//! with refinements, optional/nullable/nullish wrappers, defaults, literals
//! and enums, unions, arrays, tuples, records, nested objects and coercions.
//! Validating a [`Value`] against a [`Schema`] either yields the output
//! value (coerced, defaulted, unknown keys stripped) or the complete list of
//! path-tagged [`Issue`]s.
//!
//! ## Quick Start
//!
//! ```rust
//! use zodiac::prelude::*;
//!
//! let user: Schema = zodiac::object()
//!     .field("name", zodiac::string().min(2))
//!     .field("email", zodiac::email())
//!     .field("age", zodiac::number().positive())
//!     .into();
//!
//! let input = Value::from(serde_json::json!({"name": "a", "email": "bad", "age": -5}));
//! let result = user.safe_parse(&input);
//!
//! let paths: Vec<String> = result.issues().iter().map(|i| i.path.to_string()).collect();
//! assert_eq!(paths, ["name", "email", "age"]);
//! ```
//!
//! ## Two Failure Modes
//!
//! | Entry point | Returns |
//! |-------------|---------|
//! | [`Schema::safe_parse`] | [`ValidationResult`], never fails |
//! | [`Schema::parse`] | `Result<Value, ValidationError>`, for `?` propagation |
//!
//! Both run the same validator; `parse` is a thin wrapper over `safe_parse`.
//!
//! ## Issue Codes
//!
//! | Code | Raised when |
//! |------|-------------|
//! | `type_mismatch` | the value has the wrong kind (refinements are then skipped) |
//! | `too_small` / `too_large` | a size or range refinement fails |
//! | `invalid_format` | a format refinement fails (email, url, regex, ...) |
//! | `invalid_literal` / `invalid_enum_value` | no exact match |
//! | `invalid_union` | no alternative matched |
//! | `required` | the value is absent where it is required |
//! | `custom` | a [`SchemaExt::refine`] predicate returned false |
//! | `unrecognized_keys` | a strict object saw undeclared keys |
//!
//! Building a schema that can never validate (a minimum above its maximum,
//! a duplicate field, an empty enum) panics immediately with a
//! [`SchemaError`]; the `try_*` builder methods return it instead.

#![warn(missing_docs)]

pub mod coerce;
pub mod contract;
mod engine;
pub mod env;
mod error;
mod issue;
mod options;
mod report;
pub mod schema;
mod value;

#[cfg(test)]
mod tests;

pub use coerce::Coercion;
pub use error::{SchemaError, ValidationError};
pub use issue::{Issue, IssueCode, Path, PathSegment};
pub use options::{ParseOptions, UnknownKeys};
pub use report::{FlattenedErrors, ValidationResult, flatten};
pub use schema::{
    ArraySchema, BooleanSchema, DateSchema, NumberSchema, ObjectSchema, Schema, SchemaExt,
    StringSchema,
};
pub use value::{Map, Value, ValueKind};

// =============================================================================
// Constructors
// =============================================================================

/// A string.
pub fn string() -> StringSchema {
    StringSchema::new()
}

/// A number (any finite or infinite value; never NaN).
pub fn number() -> NumberSchema {
    NumberSchema::new()
}

/// A whole number. Fractional input is a `type_mismatch`.
pub fn int() -> NumberSchema {
    NumberSchema::integer()
}

/// A boolean.
pub fn boolean() -> BooleanSchema {
    BooleanSchema::new()
}

/// A date.
pub fn date() -> DateSchema {
    DateSchema::new()
}

/// Any value, including an absent one.
pub fn unknown() -> Schema {
    Schema::unknown()
}

/// Only an absent value.
pub fn void() -> Schema {
    Schema::void()
}

/// Exactly `value`. See [`Schema::literal`].
pub fn literal(value: impl Into<Value>) -> Schema {
    Schema::literal(value)
}

/// One of a fixed set of strings. See [`Schema::enumeration`].
pub fn enumeration<I, S>(values: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Schema::enumeration(values)
}

/// An object without fields; add them with [`ObjectSchema::field`].
pub fn object() -> ObjectSchema {
    ObjectSchema::new()
}

/// An array whose elements satisfy `element`.
pub fn array(element: impl Into<Schema>) -> ArraySchema {
    ArraySchema::new(element)
}

/// A fixed-arity tuple. See [`Schema::tuple`].
pub fn tuple<I, S>(items: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<Schema>,
{
    Schema::tuple(items)
}

/// A dynamic-key mapping. See [`Schema::record`].
pub fn record(key: impl Into<Schema>, value: impl Into<Schema>) -> Schema {
    Schema::record(key, value)
}

/// The first matching alternative. See [`Schema::union`].
pub fn union<I, S>(alternatives: I) -> Schema
where
    I: IntoIterator<Item = S>,
    S: Into<Schema>,
{
    Schema::union(alternatives)
}

/// A string holding an email address.
pub fn email() -> StringSchema {
    string().email()
}

/// A string holding an absolute URL.
pub fn url() -> StringSchema {
    string().url()
}

/// A string holding a hyphenated UUID.
pub fn uuid() -> StringSchema {
    string().uuid()
}

/// Prelude module for convenient imports.
///
/// ```rust
/// use zodiac::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        FlattenedErrors, Issue, IssueCode, ParseOptions, Path, Schema, SchemaExt, UnknownKeys,
        ValidationError, ValidationResult, Value,
    };
}
