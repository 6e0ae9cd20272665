//! The tabular CRUD engine.
//!
//! Composes the schema, the encryptor, the quota monitor, and an injected
//! backend handle into create/insert/read/update/delete/rename/destroy over
//! the row-oriented representation.

mod engine;
mod errors;
mod filters;

pub use engine::TabularStore;
pub use errors::{StoreError, StoreResult};

use std::collections::HashMap;

use crate::schema::Value;

/// In-memory representation of one data row: field name to typed value.
/// Also the shape of filter and update arguments.
pub type Row = HashMap<String, Value>;
