//! Typed cell values.
//!
//! `Value` is the single in-memory representation for row cells, filter
//! values, and update values: a closed variant over the six field types.
//! The wire form is always a plain string, since the backend only stores
//! flat cell text.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::types::FieldType;

/// Canonical wire token for a true boolean cell
pub const BOOL_TRUE: &str = "TRUE";
/// Canonical wire token for a false boolean cell
pub const BOOL_FALSE: &str = "FALSE";

/// Wire format for date cells
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Wire format for datetime cells (fractional seconds optional)
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A typed cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// UTF-8 string
    String(String),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point
    Float(f64),
    /// Boolean
    Boolean(bool),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time, no timezone
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns the field type of this value.
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::String(_) => FieldType::String,
            Value::Integer(_) => FieldType::Integer,
            Value::Float(_) => FieldType::Float,
            Value::Boolean(_) => FieldType::Boolean,
            Value::Date(_) => FieldType::Date,
            Value::DateTime(_) => FieldType::DateTime,
        }
    }

    /// Encodes this value as its canonical cell string.
    ///
    /// Booleans encode as fixed upper-case tokens and dates as ISO-8601 so
    /// the decode side is unambiguous.
    pub fn to_wire(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(true) => BOOL_TRUE.to_string(),
            Value::Boolean(false) => BOOL_FALSE.to_string(),
            Value::Date(d) => d.format(DATE_FORMAT).to_string(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_wire_tokens_are_canonical() {
        assert_eq!(Value::Boolean(true).to_wire(), "TRUE");
        assert_eq!(Value::Boolean(false).to_wire(), "FALSE");
    }

    #[test]
    fn test_date_wire_format() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(Value::Date(d).to_wire(), "2024-03-07");
    }

    #[test]
    fn test_datetime_wire_format_round_trips() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(13, 45, 9)
            .unwrap();
        let wire = Value::DateTime(dt).to_wire();
        assert_eq!(wire, "2024-03-07T13:45:09");
        let parsed = NaiveDateTime::parse_from_str(&wire, DATETIME_FORMAT).unwrap();
        assert_eq!(parsed, dt);
    }

    #[test]
    fn test_value_reports_its_field_type() {
        assert_eq!(Value::from("x").field_type(), FieldType::String);
        assert_eq!(Value::from(1i64).field_type(), FieldType::Integer);
        assert_eq!(Value::from(1.5).field_type(), FieldType::Float);
        assert_eq!(Value::from(true).field_type(), FieldType::Boolean);
    }
}
