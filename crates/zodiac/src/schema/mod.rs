//! Immutable schema trees.
//!
//! A [`Schema`] is a cheaply clonable handle to an immutable node. Builders
//! ([`StringSchema`], [`NumberSchema`], [`ObjectSchema`], ...) collect
//! refinements by value and are frozen into a [`Schema`] when composed or
//! validated. Every modifier returns a new tree; the receiver is never
//! mutated, and subtrees may be shared between schemas.
//!
//! # Example
//!
//! ```rust
//! use zodiac::prelude::*;
//!
//! let user: Schema = zodiac::object()
//!     .field("name", zodiac::string().min(2))
//!     .field("theme", zodiac::string().default("light"))
//!     .field("nickname", zodiac::string().nullish())
//!     .into();
//!
//! let parsed = user.parse(&Value::from(serde_json::json!({"name": "Ada"}))).unwrap();
//! assert_eq!(parsed.get("theme"), &Value::from("light"));
//! ```

mod array;
pub(crate) mod checks;
mod date;
mod number;
mod object;
mod string;

pub use array::ArraySchema;
pub use date::DateSchema;
pub use number::NumberSchema;
pub use object::ObjectSchema;
pub use string::StringSchema;

pub(crate) use array::ArrayCheck;
pub(crate) use date::DateCheck;
pub(crate) use number::{NumberCheck, NumberKind};
pub(crate) use string::StringCheck;

use crate::coerce::Coercion;
use crate::error::{SchemaError, invalid_schema};
use crate::value::{Value, ValueKind};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// An immutable, shareable validation schema.
#[derive(Clone, Debug)]
pub struct Schema {
    node: Arc<Node>,
}

#[derive(Debug)]
pub(crate) enum Node {
    String(StringSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    Date(DateSchema),
    Unknown,
    Void,
    Literal(Value),
    Enum(Vec<String>),
    Optional(Schema),
    Nullable(Schema),
    Nullish(Schema),
    Default(Schema, Value),
    Object(ObjectSchema),
    Array(ArraySchema),
    Tuple(Vec<Schema>),
    Record(Schema, Schema),
    Union(Vec<Schema>),
    Coerced(Schema, Coercion),
    Refined(Schema, Refine),
}

/// A user predicate attached with [`SchemaExt::refine`].
#[derive(Clone)]
pub(crate) struct Refine {
    pub(crate) predicate: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
    pub(crate) message: String,
}

impl fmt::Debug for Refine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refine")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl Schema {
    pub(crate) fn from_node(node: Node) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    pub(crate) fn node(&self) -> &Node {
        &self.node
    }

    /// Accepts any value, including an absent one, unchanged.
    pub fn unknown() -> Self {
        Self::from_node(Node::Unknown)
    }

    /// Accepts only an absent value.
    pub fn void() -> Self {
        Self::from_node(Node::Void)
    }

    /// Exact match against a string, number, boolean or null.
    ///
    /// # Panics
    ///
    /// Panics with [`SchemaError::InvalidLiteral`] for any other value.
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::try_literal(value).unwrap_or_else(|e| invalid_schema(e))
    }

    /// Fallible form of [`Schema::literal`].
    pub fn try_literal(value: impl Into<Value>) -> Result<Self, SchemaError> {
        let value = value.into();
        match value.kind() {
            ValueKind::Null | ValueKind::Boolean | ValueKind::Number | ValueKind::String => {
                Ok(Self::from_node(Node::Literal(value)))
            }
            other => Err(SchemaError::InvalidLiteral(other)),
        }
    }

    /// A string that must be one of `values`.
    ///
    /// # Panics
    ///
    /// Panics when `values` is empty or contains duplicates.
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::try_enumeration(values).unwrap_or_else(|e| invalid_schema(e))
    }

    /// Fallible form of [`Schema::enumeration`].
    pub fn try_enumeration<I, S>(values: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(SchemaError::EmptyEnum);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = values.iter().find(|v| !seen.insert(v.as_str())) {
            return Err(SchemaError::DuplicateEnumValue(dup.clone()));
        }
        Ok(Self::from_node(Node::Enum(values)))
    }

    /// The first alternative that validates wins.
    ///
    /// # Panics
    ///
    /// Panics when `alternatives` is empty.
    pub fn union<I, S>(alternatives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Schema>,
    {
        let alternatives: Vec<Schema> = alternatives.into_iter().map(Into::into).collect();
        if alternatives.is_empty() {
            invalid_schema(SchemaError::EmptyUnion);
        }
        Self::from_node(Node::Union(alternatives))
    }

    /// A fixed-arity sequence with one schema per position.
    pub fn tuple<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Schema>,
    {
        Self::from_node(Node::Tuple(items.into_iter().map(Into::into).collect()))
    }

    /// A mapping with arbitrary keys; every key is checked against `key`
    /// (as a string) and every value against `value`.
    pub fn record(key: impl Into<Schema>, value: impl Into<Schema>) -> Self {
        Self::from_node(Node::Record(key.into(), value.into()))
    }

    /// Feed input through `coercion` before validating it against `inner`.
    pub fn coerced(inner: impl Into<Schema>, coercion: Coercion) -> Self {
        Self::from_node(Node::Coerced(inner.into(), coercion))
    }

    /// Whether an absent value can pass this schema.
    pub fn accepts_absent(&self) -> bool {
        match self.node() {
            Node::Optional(_) | Node::Nullish(_) | Node::Default(..) | Node::Unknown | Node::Void => {
                true
            }
            Node::Coerced(inner, _) | Node::Refined(inner, _) | Node::Nullable(inner) => {
                inner.accepts_absent()
            }
            Node::Union(alternatives) => alternatives.iter().any(Schema::accepts_absent),
            _ => false,
        }
    }
}

/// Modifiers available on every schema and schema builder.
///
/// Each method consumes the receiver and returns a new [`Schema`] that wraps
/// it; the wrapped constraint itself is unchanged.
pub trait SchemaExt: Into<Schema> + Sized {
    /// Also accept an absent value.
    fn optional(self) -> Schema {
        Schema::from_node(Node::Optional(self.into()))
    }

    /// Also accept `null`.
    fn nullable(self) -> Schema {
        Schema::from_node(Node::Nullable(self.into()))
    }

    /// Also accept `null` or an absent value.
    fn nullish(self) -> Schema {
        Schema::from_node(Node::Nullish(self.into()))
    }

    /// Replace an absent value with `value` and validate the replacement.
    ///
    /// # Panics
    ///
    /// Panics when `value` is [`Value::Absent`].
    fn default(self, value: impl Into<Value>) -> Schema {
        let value = value.into();
        if value.is_absent() {
            invalid_schema(SchemaError::AbsentDefault);
        }
        Schema::from_node(Node::Default(self.into(), value))
    }

    /// Union of this schema and `other`, tried in that order.
    fn or(self, other: impl Into<Schema>) -> Schema {
        let this = self.into();
        let mut alternatives = match this.node() {
            Node::Union(existing) => existing.clone(),
            _ => vec![this],
        };
        alternatives.push(other.into());
        Schema::from_node(Node::Union(alternatives))
    }

    /// Attach a custom predicate, evaluated on the output of this schema
    /// only when it validated. A false result is a `custom` issue.
    fn refine<F>(self, predicate: F, message: impl Into<String>) -> Schema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Schema::from_node(Node::Refined(
            self.into(),
            Refine {
                predicate: Arc::new(predicate),
                message: message.into(),
            },
        ))
    }

    /// Feed input through `coercion` first.
    fn preprocess(self, coercion: Coercion) -> Schema {
        Schema::coerced(self, coercion)
    }
}

impl<T: Into<Schema>> SchemaExt for T {}

/// Builder for boolean schemas.
#[derive(Debug, Clone, Default)]
pub struct BooleanSchema {
    pub(crate) type_message: Option<String>,
    coercion: Option<Coercion>,
}

impl BooleanSchema {
    /// Create a strict boolean schema.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Message used when the value is not a boolean.
    pub fn type_message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }

    pub(crate) fn with_coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = Some(coercion);
        self
    }
}

/// Wraps a primitive node in its coercion, if one was requested.
pub(crate) fn freeze(node: Node, coercion: Option<Coercion>) -> Schema {
    let schema = Schema::from_node(node);
    match coercion {
        Some(coercion) => Schema::coerced(schema, coercion),
        None => schema,
    }
}

impl From<BooleanSchema> for Schema {
    fn from(mut builder: BooleanSchema) -> Self {
        let coercion = builder.coercion.take();
        freeze(Node::Boolean(builder), coercion)
    }
}
