//! Per-call validation settings.
//!
//! # Example
//! ```rust
//! use zodiac::{ParseOptions, UnknownKeys};
//!
//! let options = ParseOptions::new().with_unknown_keys(UnknownKeys::Strict);
//! assert_eq!(options.unknown_keys, Some(UnknownKeys::Strict));
//! ```

use serde::{Deserialize, Serialize};

/// What an object schema does with keys it does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeys {
    /// Drop unknown keys from the output.
    #[default]
    Strip,
    /// Report unknown keys as an `unrecognized_keys` issue.
    Strict,
    /// Copy unknown keys to the output unchanged.
    Passthrough,
}

/// Settings applied to one validation call.
///
/// All fields have defaults that match the behavior of the plain
/// [`Schema::safe_parse`](crate::Schema::safe_parse) entry point.
///
/// # Fields
///
/// * `unknown_keys` - When set, overrides the unknown-key policy of every
///   object schema in the tree. Default: `None` (each object uses its own).
///
/// * `union_errors` - Attach each alternative's issues to `invalid_union`
///   issues. Default: true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Unknown-key policy override for every object
    pub unknown_keys: Option<UnknownKeys>,
    /// Whether `invalid_union` issues carry per-alternative issues
    pub union_errors: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            unknown_keys: None,
            union_errors: true,
        }
    }
}

impl ParseOptions {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the unknown-key policy of every object.
    pub fn with_unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = Some(policy);
        self
    }

    /// Toggle per-alternative union details.
    pub fn with_union_errors(mut self, enabled: bool) -> Self {
        self.union_errors = enabled;
        self
    }
}
