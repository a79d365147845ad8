//! Typed environment loading.
//!
//! An [`EnvSchema`] maps variable names to schemas. Loading validates every
//! declared variable in one pass and fails with an [`EnvError`] listing all
//! problems, so a misconfigured process stops at startup instead of on first
//! use.
//!
//! Server variables are declared with [`EnvSchema::var`]. Variables that may
//! be shipped to a client are declared with [`EnvSchema::client_var`] and
//! must carry the client prefix ([`DEFAULT_CLIENT_PREFIX`] unless changed).
//!
//! # Example
//!
//! ```rust
//! use zodiac::prelude::*;
//! use zodiac::env::EnvSchema;
//!
//! let schema = EnvSchema::new()
//!     .var("DATABASE_URL", zodiac::url())
//!     .var("AUTH_SECRET", zodiac::string().min(1))
//!     .var("NODE_ENV", Schema::enumeration(["development", "production"]).default("development"))
//!     .client_var("PUBLIC_APP_URL", zodiac::url().optional())
//!     .empty_string_as_absent(true);
//!
//! let env = schema
//!     .load_from([
//!         ("DATABASE_URL", "postgres://localhost:5432/app"),
//!         ("AUTH_SECRET", "s3cret"),
//!         ("PUBLIC_APP_URL", ""),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(env.get_str("NODE_ENV"), Some("development"));
//! assert!(env.get("PUBLIC_APP_URL").is_absent());
//! assert!(env.client().is_empty());
//! ```

use crate::error::{SchemaError, ValidationError, invalid_schema};
use crate::issue::{Issue, IssueCode, Path, PathSegment};
use crate::options::{ParseOptions, UnknownKeys};
use crate::schema::{ObjectSchema, Schema};
use crate::value::{Map, Value};
use indexmap::IndexSet;
use serde::de::DeserializeOwned;
use std::ffi::{OsStr, OsString};
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix every client variable must carry unless
/// [`EnvSchema::client_prefix`] sets another one.
pub const DEFAULT_CLIENT_PREFIX: &str = "PUBLIC_";

/// Environment loading failed.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EnvError {
    /// One or more variables are missing or invalid
    #[error("invalid environment variables: {}", render(.0.issues()))]
    Invalid(ValidationError),
    /// The validated variables did not fit the requested type
    #[error("environment variable `{path}` has the wrong shape: {message}")]
    Deserialize {
        /// Variable (and nested path) where deserialization stopped
        path: String,
        /// Deserializer message
        message: String,
    },
}

impl EnvError {
    /// The validation issues, keyed by variable name in their paths.
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Invalid(error) => error.issues(),
            Self::Deserialize { .. } => &[],
        }
    }
}

fn render(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{} ({})", issue.path, issue.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A fixed mapping from variable name to schema.
#[derive(Debug, Clone)]
pub struct EnvSchema {
    vars: ObjectSchema,
    client: IndexSet<String>,
    client_prefix: String,
    empty_string_as_absent: bool,
}

impl Default for EnvSchema {
    fn default() -> Self {
        Self {
            vars: ObjectSchema::new(),
            client: IndexSet::new(),
            client_prefix: DEFAULT_CLIENT_PREFIX.to_string(),
            empty_string_as_absent: false,
        }
    }
}

impl EnvSchema {
    /// Create an empty environment schema.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Declare a server variable.
    ///
    /// # Panics
    ///
    /// Panics when `name` is already declared.
    pub fn var(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.vars = self.vars.field(name, schema);
        self
    }

    /// Declare a client variable. Its name must start with the client
    /// prefix.
    ///
    /// # Panics
    ///
    /// Panics when `name` lacks the prefix or is already declared.
    pub fn client_var(self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.try_client_var(name, schema)
            .unwrap_or_else(|e| invalid_schema(e))
    }

    /// Fallible form of [`EnvSchema::client_var`].
    pub fn try_client_var(
        mut self,
        name: impl Into<String>,
        schema: impl Into<Schema>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        self.check_prefix(&name)?;
        self.vars = self.vars.try_field(name.clone(), schema)?;
        self.client.insert(name);
        Ok(self)
    }

    /// Replace the client prefix.
    ///
    /// # Panics
    ///
    /// Panics when a client variable declared earlier lacks the new prefix.
    pub fn client_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.client_prefix = prefix.into();
        if let Some(err) = self.client.iter().find_map(|name| self.check_prefix(name).err()) {
            invalid_schema(err);
        }
        self
    }

    fn check_prefix(&self, name: &str) -> Result<(), SchemaError> {
        if name.starts_with(self.client_prefix.as_str()) {
            Ok(())
        } else {
            Err(SchemaError::MissingClientPrefix {
                name: name.to_string(),
                prefix: self.client_prefix.clone(),
            })
        }
    }

    /// Treat variables set to the empty string as unset, so they fall back
    /// to their default or optional handling.
    pub fn empty_string_as_absent(mut self, enabled: bool) -> Self {
        self.empty_string_as_absent = enabled;
        self
    }

    /// Declared variable names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys()
    }

    /// Declared client variable names in order.
    pub fn client_names(&self) -> impl Iterator<Item = &str> {
        self.client.iter().map(String::as_str)
    }

    /// Validate the given variables. Undeclared variables are ignored.
    pub fn load_from<I, K, V>(&self, vars: I) -> Result<Env, EnvError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut input = Map::new();
        for (name, raw) in vars {
            let name = name.into();
            if self.vars.get(&name).is_some() {
                self.accept(&mut input, name, raw.into());
            }
        }
        self.finish(input, Vec::new())
    }

    /// Validate raw OS variables. Undeclared variables are skipped before
    /// any conversion; a declared variable that is not valid UTF-8 is a
    /// `type_mismatch` at its name.
    pub fn load_from_os<I, K, V>(&self, vars: I) -> Result<Env, EnvError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: Into<OsString>,
    {
        let mut input = Map::new();
        let mut unreadable = Vec::new();
        for (name, raw) in vars {
            let Some(name) = name.as_ref().to_str() else {
                continue;
            };
            if self.vars.get(name).is_none() {
                continue;
            }
            match raw.into().into_string() {
                Ok(raw) => self.accept(&mut input, name.to_string(), raw),
                Err(_) => unreadable.push(name.to_string()),
            }
        }
        self.finish(input, unreadable)
    }

    /// Validate the variables of the current process.
    pub fn load(&self) -> Result<Env, EnvError> {
        self.load_from_os(std::env::vars_os())
    }

    fn accept(&self, input: &mut Map, name: String, raw: String) {
        if self.empty_string_as_absent && raw.is_empty() {
            return;
        }
        input.insert(name, Value::String(raw));
    }

    fn finish(&self, input: Map, unreadable: Vec<String>) -> Result<Env, EnvError> {
        let schema = Schema::from(self.vars.clone());
        let options = ParseOptions::new().with_unknown_keys(UnknownKeys::Strip);
        let (values, mut issues) = match schema.parse_with(&Value::Object(input), &options) {
            Ok(Value::Object(values)) => (values, Vec::new()),
            Ok(_) => (Map::new(), Vec::new()),
            Err(error) => (Map::new(), error.into_issues()),
        };

        if !unreadable.is_empty() {
            issues.retain(|issue| match issue.path.segments().first() {
                Some(PathSegment::Key(name)) => !unreadable.contains(name),
                _ => true,
            });
            issues.extend(unreadable.iter().map(|name| {
                Issue::new(IssueCode::TypeMismatch, "Expected string, received invalid UTF-8")
                    .at(Path::root().join(name.as_str()))
            }));
            issues.sort_by_key(|issue| self.position(issue));
        }

        if issues.is_empty() {
            debug!(variable_count = values.len(), "Environment loaded");
            return Ok(Env {
                values,
                client: self.client.clone(),
            });
        }
        warn!(
            issue_count = issues.len(),
            variables = %render(&issues),
            "Environment validation failed"
        );
        Err(EnvError::Invalid(ValidationError::new(issues)))
    }

    fn position(&self, issue: &Issue) -> usize {
        match issue.path.segments().first() {
            Some(PathSegment::Key(name)) => self
                .vars
                .fields
                .get_index_of(name.as_str())
                .unwrap_or(usize::MAX),
            _ => usize::MAX,
        }
    }
}

/// Validated environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Env {
    values: Map,
    client: IndexSet<String>,
}

impl Env {
    /// The validated value of a variable; absent when unset and optional.
    pub fn get(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&crate::value::ABSENT)
    }

    /// A variable as a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).as_str()
    }

    /// A variable as a number (after coercion).
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).as_f64()
    }

    /// A variable as a boolean (after coercion).
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).as_bool()
    }

    /// Every variable that has a value.
    pub fn values(&self) -> &Map {
        &self.values
    }

    /// Whether `name` was declared as a client variable.
    pub fn is_client(&self, name: &str) -> bool {
        self.client.contains(name)
    }

    /// The client variables that have a value, safe to expose to a client.
    pub fn client(&self) -> Map {
        self.values
            .iter()
            .filter(|(name, _)| self.client.contains(name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Deserialize the variables into a typed configuration struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, EnvError> {
        let json = Value::Object(self.values.clone()).to_json();
        serde_path_to_error::deserialize::<_, T>(json).map_err(|err| {
            let path: Path = err
                .path()
                .iter()
                .filter_map(|segment| match segment {
                    serde_path_to_error::Segment::Map { key } => {
                        Some(PathSegment::Key(key.clone()))
                    }
                    serde_path_to_error::Segment::Seq { index } => Some(PathSegment::Index(*index)),
                    _ => None,
                })
                .collect();
            EnvError::Deserialize {
                path: path.to_string(),
                message: err.into_inner().to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchemaExt;

    #[test]
    fn undeclared_variables_are_ignored() {
        let env = EnvSchema::new()
            .var("PORT", crate::coerce::number().int())
            .load_from([("PORT", "8080"), ("HOME", "/root")])
            .unwrap();
        assert_eq!(env.get_f64("PORT"), Some(8080.0));
        assert!(env.get("HOME").is_absent());
    }

    #[test]
    fn undeclared_os_variables_are_never_converted() {
        let env = EnvSchema::new()
            .var("APP_NAME", crate::string().default("app"))
            .load_from_os([(
                OsString::from("UNRELATED"),
                OsString::from("value"),
            )])
            .unwrap();
        assert_eq!(env.get_str("APP_NAME"), Some("app"));
    }

    #[test]
    fn load_reads_the_process_environment() {
        let env = EnvSchema::new()
            .var("ZODIAC_SURELY_UNSET_VARIABLE", crate::string().default("fallback"))
            .load()
            .unwrap();
        assert_eq!(env.get_str("ZODIAC_SURELY_UNSET_VARIABLE"), Some("fallback"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_variables() {
        use std::os::unix::ffi::OsStringExt;

        let bytes = || OsString::from_vec(vec![0xff, 0xfe]);
        let schema = EnvSchema::new()
            .var("API_KEY", crate::string())
            .var("APP_NAME", crate::string().default("app"));

        let env = schema
            .load_from_os([(bytes(), bytes()), (OsString::from("API_KEY"), OsString::from("k"))])
            .unwrap();
        assert_eq!(env.get_str("APP_NAME"), Some("app"));

        let err = schema
            .load_from_os([(OsString::from("APP_NAME"), bytes())])
            .unwrap_err();
        assert!(matches!(err, EnvError::Invalid(_)));
        let found: Vec<(String, IssueCode, &str)> = err
            .issues()
            .iter()
            .map(|i| (i.path.to_string(), i.code, i.message.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("API_KEY".to_string(), IssueCode::Required, "Required"),
                (
                    "APP_NAME".to_string(),
                    IssueCode::TypeMismatch,
                    "Expected string, received invalid UTF-8"
                ),
            ]
        );
    }

    #[test]
    fn empty_string_is_kept_by_default() {
        let err = EnvSchema::new()
            .var("SECRET", crate::schema::StringSchema::new().min(1))
            .load_from([("SECRET", "")])
            .unwrap_err();
        assert_eq!(err.issues().len(), 1);
        assert_eq!(err.issues()[0].path.to_string(), "SECRET");
    }
}
