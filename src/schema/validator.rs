//! Per-value schema validation.
//!
//! Validation semantics:
//! - A required field with no value and no default is an error
//! - A present value must coerce to the field's declared type
//! - Unknown field names are an error
//!
//! `unique` is declared on the field but enforcement needs a full-table
//! scan, which only the store can perform; the schema has no table
//! visibility.

use super::coerce;
use super::types::Schema;
use super::value::Value;

impl Schema {
    /// Validates one value against one field, returning error strings.
    ///
    /// An empty list means the value is acceptable. `None` means the caller
    /// has no value for the field; whether that is an error depends on
    /// `required` and `default`.
    pub fn validate_value(&self, field_name: &str, value: Option<&Value>) -> Vec<String> {
        let mut errors = Vec::new();

        let field = match self.field(field_name) {
            Some(f) => f,
            None => {
                errors.push(format!("unknown field '{}'", field_name));
                return errors;
            }
        };

        match value {
            None => {
                if field.required && field.default.is_none() {
                    errors.push(format!("required field '{}' is missing", field.name));
                }
            }
            Some(v) => {
                if let Err(e) = coerce::coerce(v, field.field_type) {
                    errors.push(format!("field '{}': {}", field.name, e));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::{Field, FieldType};
    use super::*;

    fn sample_schema() -> Schema {
        Schema::new(
            "users",
            vec![
                Field::new("id", FieldType::Integer).required().unique(),
                Field::new("name", FieldType::String).required(),
                Field::new("active", FieldType::Boolean).with_default(true),
                Field::new("age", FieldType::Integer),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_valid_value_passes() {
        let schema = sample_schema();
        assert!(schema
            .validate_value("id", Some(&Value::Integer(1)))
            .is_empty());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let schema = sample_schema();
        let errors = schema.validate_value("name", None);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("required"));
    }

    #[test]
    fn test_missing_field_with_default_passes() {
        let schema = sample_schema();
        assert!(schema.validate_value("active", None).is_empty());
    }

    #[test]
    fn test_missing_optional_field_passes() {
        let schema = sample_schema();
        assert!(schema.validate_value("age", None).is_empty());
    }

    #[test]
    fn test_uncoercible_value_fails() {
        let schema = sample_schema();
        let errors = schema.validate_value("id", Some(&Value::from("not a number")));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("id"));
    }

    #[test]
    fn test_unknown_field_fails() {
        let schema = sample_schema();
        let errors = schema.validate_value("nope", Some(&Value::Integer(1)));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("unknown field"));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let schema = sample_schema();
        for _ in 0..100 {
            assert!(schema
                .validate_value("id", Some(&Value::Integer(1)))
                .is_empty());
            assert_eq!(schema.validate_value("name", None).len(), 1);
        }
    }
}
