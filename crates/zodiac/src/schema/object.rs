use super::{Node, Schema, SchemaExt};
use crate::error::{SchemaError, invalid_schema};
use crate::options::UnknownKeys;
use indexmap::IndexMap;

/// Builder for object schemas.
///
/// Fields are validated in declaration order and every field is checked even
/// after an earlier one failed. Keys the schema does not declare are handled
/// by the [`UnknownKeys`] policy, which strips them by default.
///
/// ```rust
/// use zodiac::prelude::*;
///
/// let address = zodiac::object()
///     .field("city", zodiac::string())
///     .field("zipCode", zodiac::string().optional())
///     .strict();
/// assert_eq!(address.keys().collect::<Vec<_>>(), vec!["city", "zipCode"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub(crate) fields: IndexMap<String, Schema>,
    pub(crate) unknown_keys: UnknownKeys,
    pub(crate) type_message: Option<String>,
}

impl ObjectSchema {
    /// Create an object schema without fields.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Declare a field.
    ///
    /// # Panics
    ///
    /// Panics when `name` is already declared.
    pub fn field(self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.try_field(name, schema)
            .unwrap_or_else(|e| invalid_schema(e))
    }

    /// Fallible form of [`ObjectSchema::field`].
    pub fn try_field(
        mut self,
        name: impl Into<String>,
        schema: impl Into<Schema>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if self.fields.contains_key(&name) {
            return Err(SchemaError::DuplicateField(name));
        }
        self.fields.insert(name, schema.into());
        Ok(self)
    }

    /// Add every field of `other`, replacing fields that share a name.
    /// The policy of `self` is kept.
    pub fn extend(mut self, other: ObjectSchema) -> Self {
        self.fields.extend(other.fields);
        self
    }

    /// Make every field optional.
    pub fn partial(mut self) -> Self {
        self.fields = self
            .fields
            .into_iter()
            .map(|(name, schema)| (name, schema.optional()))
            .collect();
        self
    }

    /// Reject undeclared keys with an `unrecognized_keys` issue.
    pub fn strict(self) -> Self {
        self.unknown_keys(UnknownKeys::Strict)
    }

    /// Copy undeclared keys to the output unchanged.
    pub fn passthrough(self) -> Self {
        self.unknown_keys(UnknownKeys::Passthrough)
    }

    /// Drop undeclared keys from the output (the default).
    pub fn strip(self) -> Self {
        self.unknown_keys(UnknownKeys::Strip)
    }

    /// Set the undeclared-key policy.
    pub fn unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    /// Message used when the value is not an object.
    pub fn type_message(mut self, message: impl Into<String>) -> Self {
        self.type_message = Some(message.into());
        self
    }

    /// Declared field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Schema of a declared field.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.fields.get(name)
    }
}

impl From<ObjectSchema> for Schema {
    fn from(builder: ObjectSchema) -> Self {
        Schema::from_node(Node::Object(builder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "duplicate object field `name`")]
    fn duplicate_field_panics() {
        let _ = ObjectSchema::new()
            .field("name", Schema::unknown())
            .field("name", Schema::unknown());
    }

    #[test]
    fn try_field_reports_duplicates() {
        let err = ObjectSchema::new()
            .field("a", Schema::unknown())
            .try_field("a", Schema::unknown())
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField("a".into()));
    }

    #[test]
    fn extend_replaces_and_appends() {
        let base = ObjectSchema::new()
            .field("a", Schema::literal(1))
            .field("b", Schema::literal(2));
        let merged = base.extend(
            ObjectSchema::new()
                .field("b", Schema::literal(3))
                .field("c", Schema::literal(4)),
        );
        assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn partial_makes_fields_optional() {
        let schema = ObjectSchema::new()
            .field("a", Schema::literal(1))
            .partial();
        assert!(schema.get("a").is_some_and(Schema::accepts_absent));
    }
}
