//! Schema type definitions.
//!
//! A `Schema` declares the ordered columns of one logical table. Field order
//! is the canonical column order used for header generation and positional
//! row encoding; it must never reorder once rows exist, or row decoding
//! breaks. Schemas are immutable after construction.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::coerce;
use super::errors::{SchemaError, SchemaResult};
use super::value::Value;

/// Supported field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Integer,
    /// 64-bit floating point
    Float,
    /// Boolean
    Boolean,
    /// Calendar date (`YYYY-MM-DD`)
    Date,
    /// ISO-8601 date and time
    DateTime,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// One typed, constrained column in a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Column name, unique within the schema
    pub name: String,
    /// Declared data type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether a value (or default) must be present on insert
    #[serde(default)]
    pub required: bool,
    /// Whether values must be unique across all rows
    #[serde(default)]
    pub unique: bool,
    /// Value substituted when the field is absent on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Whether values are stored encrypted at rest
    #[serde(default)]
    pub encrypted: bool,
}

impl Field {
    /// Creates a plain optional field of the given type.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            unique: false,
            default: None,
            encrypted: false,
        }
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the field as unique across rows.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Marks the field as encrypted at rest.
    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    /// Sets the default used when the field is absent on insert.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Ordered column declarations for one logical table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    /// Creates a schema, checking its own invariants.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if two fields share a name, or if a declared
    /// default does not satisfy its field's own type.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> SchemaResult<Self> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
            if let Some(default) = &field.default {
                coerce::coerce(default, field.field_type).map_err(|source| {
                    SchemaError::InvalidDefault {
                        field: field.name.clone(),
                        source,
                    }
                })?;
            }
        }
        Ok(Self {
            name: name.into(),
            fields,
        })
    }

    /// The backend sub-table name this schema maps to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in canonical column order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Ordered field names used to seed the backend's header row.
    pub fn header(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schema() -> Schema {
        Schema::new(
            "users",
            vec![
                Field::new("id", FieldType::Integer).required().unique(),
                Field::new("name", FieldType::String).required(),
                Field::new("age", FieldType::Integer),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_header_follows_field_order() {
        let schema = sample_schema();
        assert_eq!(schema.header(), vec!["id", "name", "age"]);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = Schema::new(
            "users",
            vec![
                Field::new("id", FieldType::Integer),
                Field::new("id", FieldType::String),
            ],
        );
        assert!(matches!(result, Err(SchemaError::DuplicateField(name)) if name == "id"));
    }

    #[test]
    fn test_default_must_satisfy_field_type() {
        let result = Schema::new(
            "users",
            vec![Field::new("age", FieldType::Integer).with_default("not a number")],
        );
        assert!(matches!(result, Err(SchemaError::InvalidDefault { field, .. }) if field == "age"));
    }

    #[test]
    fn test_coercible_default_accepted() {
        // "42" parses as an integer, so it is a valid default for an integer field
        let result = Schema::new(
            "users",
            vec![Field::new("age", FieldType::Integer).with_default("42")],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_field_lookup() {
        let schema = sample_schema();
        assert!(schema.field("name").is_some());
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn test_schema_round_trips_through_json() {
        let schema = sample_schema();
        let json = serde_json::to_string(&schema).unwrap();
        let back: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, schema);
    }
}
