//! Procedure contracts.
//!
//! A [`ProcedureContract`] pairs opaque route metadata with an input and an
//! output schema. The input is validated before the handler runs and the
//! handler's return value is validated before it leaves the procedure, so a
//! malformed payload never reaches handler code and a handler bug never
//! reaches a client. Transport and routing belong to the caller.
//!
//! # Example
//!
//! ```rust
//! use zodiac::prelude::*;
//! use zodiac::contract::{Method, ProcedureContract, RouteMeta};
//!
//! let get_posts = ProcedureContract::new("post.getPosts")
//!     .meta(
//!         RouteMeta::new(Method::Get, "/posts")
//!             .summary("Get all posts")
//!             .tag("posts"),
//!     )
//!     .input(Schema::void())
//!     .output(Schema::void());
//!
//! let output = get_posts
//!     .call(&Value::Absent, |_input| Ok::<_, std::io::Error>(Value::Absent))
//!     .unwrap();
//! assert!(output.is_absent());
//! ```

use crate::error::ValidationError;
use crate::issue::Issue;
use crate::schema::Schema;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Boxed error returned by a handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// HTTP-style method of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// GET
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl Method {
    /// Returns the uppercase method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// Route metadata. Carried along unchanged; validation never reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteMeta {
    /// Route method
    pub method: Method,
    /// Route path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Short description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Longer description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags for grouping
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Whether the route is deprecated
    #[serde(default)]
    pub deprecated: bool,
}

impl RouteMeta {
    /// Create metadata for `method` at `path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: Some(path.into()),
            ..<Self as Default>::default()
        }
    }

    /// Set the summary.
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Mark as deprecated.
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

/// A procedure call was rejected or failed.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The input did not satisfy the input schema; the handler never ran
    #[error("invalid input for `{procedure}`: {source}")]
    Input {
        /// Procedure name
        procedure: String,
        /// The validation failure
        source: ValidationError,
    },
    /// The handler returned a value that does not satisfy the output schema
    #[error("invalid output from `{procedure}`: {source}")]
    Output {
        /// Procedure name
        procedure: String,
        /// The validation failure
        source: ValidationError,
    },
    /// The handler itself failed
    #[error("handler for `{procedure}` failed: {source}")]
    Handler {
        /// Procedure name
        procedure: String,
        /// The handler's error
        source: HandlerError,
    },
}

impl ContractError {
    /// Error code suitable for a transport layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Input { .. } => "BAD_REQUEST",
            Self::Output { .. } | Self::Handler { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    /// The validation issues, if this is a validation failure.
    pub fn issues(&self) -> &[Issue] {
        match self {
            Self::Input { source, .. } | Self::Output { source, .. } => source.issues(),
            Self::Handler { .. } => &[],
        }
    }
}

/// Input and output schemas of one procedure.
#[derive(Debug, Clone)]
pub struct ProcedureContract {
    name: String,
    meta: RouteMeta,
    input: Schema,
    output: Option<Schema>,
}

impl ProcedureContract {
    /// Create a contract that accepts any input and does not check output.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta: RouteMeta::default(),
            input: Schema::unknown(),
            output: None,
        }
    }

    /// Set the route metadata.
    pub fn meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Set the input schema.
    pub fn input(mut self, schema: impl Into<Schema>) -> Self {
        self.input = schema.into();
        self
    }

    /// Set the output schema.
    pub fn output(mut self, schema: impl Into<Schema>) -> Self {
        self.output = Some(schema.into());
        self
    }

    /// Procedure name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Route metadata.
    pub fn route(&self) -> &RouteMeta {
        &self.meta
    }

    /// Validate an inbound payload.
    pub fn validate_input(&self, input: &Value) -> Result<Value, ContractError> {
        self.input.parse(input).map_err(|source| {
            debug!(
                procedure = %self.name,
                issue_count = source.issues().len(),
                "Procedure input rejected"
            );
            ContractError::Input {
                procedure: self.name.clone(),
                source,
            }
        })
    }

    /// Validate a handler's return value. Without an output schema the
    /// value is returned unchanged.
    pub fn validate_output(&self, output: Value) -> Result<Value, ContractError> {
        let Some(schema) = &self.output else {
            return Ok(output);
        };
        schema.parse(&output).map_err(|source| {
            warn!(
                procedure = %self.name,
                issue_count = source.issues().len(),
                "Procedure output rejected"
            );
            ContractError::Output {
                procedure: self.name.clone(),
                source,
            }
        })
    }

    /// Validate `input`, run `handler` on the validated value and validate
    /// what it returns.
    pub fn call<F, E>(&self, input: &Value, handler: F) -> Result<Value, ContractError>
    where
        F: FnOnce(Value) -> Result<Value, E>,
        E: Into<HandlerError>,
    {
        let input = self.validate_input(input)?;
        trace!(procedure = %self.name, "Calling procedure handler");
        let output = handler(input).map_err(|e| self.handler_error(e))?;
        self.validate_output(output)
    }

    /// Async form of [`ProcedureContract::call`].
    pub async fn call_async<F, Fut, E>(
        &self,
        input: &Value,
        handler: F,
    ) -> Result<Value, ContractError>
    where
        F: FnOnce(Value) -> Fut,
        Fut: Future<Output = Result<Value, E>>,
        E: Into<HandlerError>,
    {
        let input = self.validate_input(input)?;
        trace!(procedure = %self.name, "Calling async procedure handler");
        let output = handler(input).await.map_err(|e| self.handler_error(e))?;
        self.validate_output(output)
    }

    fn handler_error<E: Into<HandlerError>>(&self, error: E) -> ContractError {
        let source = error.into();
        debug!(procedure = %self.name, error = %source, "Procedure handler failed");
        ContractError::Handler {
            procedure: self.name.clone(),
            source,
        }
    }
}
