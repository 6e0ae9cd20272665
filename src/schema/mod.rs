//! Schema and field model.
//!
//! Declares column names, types, and constraints; performs type coercion and
//! per-value validation. The schema is the single authority for converting
//! between typed values and the wire string form the backend stores.

pub mod coerce;
mod errors;
mod types;
mod validator;
mod value;

pub use errors::{ConversionError, SchemaError, SchemaResult};
pub use types::{Field, FieldType, Schema};
pub use value::{Value, BOOL_FALSE, BOOL_TRUE, DATETIME_FORMAT, DATE_FORMAT};
