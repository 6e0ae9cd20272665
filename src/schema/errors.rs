//! # Schema Errors
//!
//! Error types for schema construction and value coercion.

use thiserror::Error;

use super::types::FieldType;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while constructing a schema or coercing values against it
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    /// Two fields share the same name
    #[error("duplicate field name '{0}' in schema")]
    DuplicateField(String),

    /// A declared default does not satisfy the field's own type
    #[error("default for field '{field}' does not satisfy its declared type: {source}")]
    InvalidDefault {
        /// Name of the offending field
        field: String,
        /// The underlying coercion failure
        source: ConversionError,
    },

    /// A value could not be coerced to the declared field type
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Coercion failure carrying the offending value and the target type.
///
/// Coercion never silently truncates or substitutes a default; any parse
/// failure surfaces as this error.
#[derive(Debug, Clone, Error)]
#[error("cannot convert '{value}' to {target}")]
pub struct ConversionError {
    /// String rendering of the rejected value
    pub value: String,
    /// The type the value was supposed to become
    pub target: FieldType,
}

impl ConversionError {
    pub fn new(value: impl Into<String>, target: FieldType) -> Self {
        Self {
            value: value.into(),
            target,
        }
    }
}
