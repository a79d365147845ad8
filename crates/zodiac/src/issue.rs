//! Validation issues and the paths that locate them.
//!
//! # Issue Codes
//!
//! Codes are represented by the [`IssueCode`] enum. When serialized they are
//! rendered in snake_case (e.g. `TypeMismatch` becomes `"type_mismatch"`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum IssueCode {
    /// The value has the wrong runtime type (or a tuple has the wrong arity)
    TypeMismatch,
    /// A lower bound was violated
    TooSmall,
    /// An upper bound was violated
    TooLarge,
    /// A string or number did not satisfy a format check
    InvalidFormat,
    /// The value differs from the expected literal
    InvalidLiteral,
    /// The value is not one of the enumerated options
    InvalidEnumValue,
    /// No union alternative matched
    InvalidUnion,
    /// A required value is absent
    Required,
    /// A user supplied refinement failed
    Custom,
    /// A strict object received keys it does not declare
    UnrecognizedKeys,
}

impl IssueCode {
    /// Returns the string representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeMismatch => "type_mismatch",
            Self::TooSmall => "too_small",
            Self::TooLarge => "too_large",
            Self::InvalidFormat => "invalid_format",
            Self::InvalidLiteral => "invalid_literal",
            Self::InvalidEnumValue => "invalid_enum_value",
            Self::InvalidUnion => "invalid_union",
            Self::Required => "required",
            Self::Custom => "custom",
            Self::UnrecognizedKeys => "unrecognized_keys",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step into a nested value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// An object field or record key
    Key(String),
    /// An array or tuple position
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Location of a value inside a nested input.
///
/// Renders as `address.city`, `tags[0]` or `activities[1].title`; the root
/// path renders as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns true for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The segments from outermost to innermost.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns a new path extended by one segment.
    pub fn join(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Where the failure happened
    pub path: Path,
    /// Human-readable message
    pub message: String,
    /// Kind of failure
    pub code: IssueCode,
    /// Issues of every alternative, for [`IssueCode::InvalidUnion`]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub union_errors: Vec<Vec<Issue>>,
    /// Offending keys, for [`IssueCode::UnrecognizedKeys`]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
}

impl Issue {
    /// Create an issue at the root path.
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: Path::root(),
            message: message.into(),
            code,
            union_errors: Vec::new(),
            keys: Vec::new(),
        }
    }

    /// Create a [`IssueCode::Custom`] issue.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(IssueCode::Custom, message)
    }

    /// Set the path.
    pub fn at(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    /// Attach per-alternative issues.
    pub fn with_union_errors(mut self, union_errors: Vec<Vec<Issue>>) -> Self {
        self.union_errors = union_errors;
        self
    }

    /// Attach offending keys.
    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}
