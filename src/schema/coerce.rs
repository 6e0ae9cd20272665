//! Value coercion.
//!
//! The schema is the single authority for coercion between typed values and
//! the wire string form the backend stores. Coercion is strict: any parse
//! failure surfaces as a `ConversionError`; nothing truncates or falls back
//! to a default.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value as Json;

use super::errors::ConversionError;
use super::types::FieldType;
use super::value::{Value, BOOL_FALSE, BOOL_TRUE, DATETIME_FORMAT, DATE_FORMAT};

// Hand-edited sheets sometimes carry a space instead of the T separator.
const DATETIME_FORMAT_SPACED: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Coerces a typed value to the target field type.
///
/// Strings coerce by parsing their wire form; integers widen to floats and
/// truthy-coerce to booleans. Anything else cross-type is an error.
pub fn coerce(value: &Value, target: FieldType) -> Result<Value, ConversionError> {
    if value.field_type() == target {
        return Ok(value.clone());
    }
    match (value, target) {
        (Value::String(s), _) => parse_wire(s, target),
        (Value::Integer(i), FieldType::Float) => Ok(Value::Float(*i as f64)),
        (Value::Integer(i), FieldType::Boolean) => Ok(Value::Boolean(*i != 0)),
        (v, FieldType::String) => Ok(Value::String(v.to_wire())),
        (v, _) => Err(ConversionError::new(v.to_wire(), target)),
    }
}

/// Parses a cell string into the target field type.
pub fn parse_wire(cell: &str, target: FieldType) -> Result<Value, ConversionError> {
    let fail = || ConversionError::new(cell, target);
    match target {
        FieldType::String => Ok(Value::String(cell.to_string())),
        FieldType::Integer => cell
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| fail()),
        FieldType::Float => cell
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| fail()),
        FieldType::Boolean => match cell.trim().to_ascii_uppercase().as_str() {
            BOOL_TRUE | "1" => Ok(Value::Boolean(true)),
            BOOL_FALSE | "0" => Ok(Value::Boolean(false)),
            _ => Err(fail()),
        },
        FieldType::Date => NaiveDate::parse_from_str(cell.trim(), DATE_FORMAT)
            .map(Value::Date)
            .map_err(|_| fail()),
        FieldType::DateTime => {
            let trimmed = cell.trim();
            NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT)
                .or_else(|_| NaiveDateTime::parse_from_str(trimmed, DATETIME_FORMAT_SPACED))
                .map(Value::DateTime)
                .map_err(|_| fail())
        }
    }
}

/// Encodes a typed value as JSON for the encrypted-at-rest form.
///
/// Dates and datetimes encode as their wire strings so the round trip stays
/// exact regardless of JSON number handling.
pub fn to_json(value: &Value) -> Json {
    match value {
        Value::String(s) => Json::String(s.clone()),
        Value::Integer(i) => Json::from(*i),
        Value::Float(f) => Json::from(*f),
        Value::Boolean(b) => Json::Bool(*b),
        Value::Date(_) | Value::DateTime(_) => Json::String(value.to_wire()),
    }
}

/// Decodes a decrypted JSON payload back into the target field type.
pub fn from_json(json: &Json, target: FieldType) -> Result<Value, ConversionError> {
    let fail = || ConversionError::new(json.to_string(), target);
    match target {
        FieldType::String => json
            .as_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(fail),
        FieldType::Integer => json.as_i64().map(Value::Integer).ok_or_else(fail),
        FieldType::Float => json
            .as_f64()
            .map(Value::Float)
            .ok_or_else(fail),
        FieldType::Boolean => json.as_bool().map(Value::Boolean).ok_or_else(fail),
        FieldType::Date | FieldType::DateTime => {
            let s = json.as_str().ok_or_else(fail)?;
            parse_wire(s, target)
        }
    }
}
