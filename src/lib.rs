//! gridstore - a typed, schema-enforced row store over remote spreadsheet
//! backends.
//!
//! Define columns with types and constraints, then insert, read, update, and
//! delete rows through a validated API instead of raw cell operations. The
//! backend only exposes flat 2-D cell ranges with no row ids, indexes, or
//! transactions; the store emulates relational semantics (unique keys, row
//! addressing, batch mutation) on top, with optional field-level encryption
//! and a local request-rate guard.
//!
//! ```no_run
//! use gridstore::{Field, FieldType, MemoryBackend, Row, Schema, TabularStore, Value};
//!
//! # async fn example() -> Result<(), gridstore::StoreError> {
//! let schema = Schema::new(
//!     "users",
//!     vec![
//!         Field::new("id", FieldType::Integer).required().unique(),
//!         Field::new("email", FieldType::String).required(),
//!     ],
//! ).expect("valid schema");
//!
//! let mut store = TabularStore::new(MemoryBackend::new(), schema);
//! store.create_table("User Database").await?;
//!
//! let mut row = Row::new();
//! row.insert("id".into(), Value::Integer(1));
//! row.insert("email".into(), Value::from("a@x.com"));
//! store.insert(row).await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod encryption;
pub mod quota;
pub mod schema;
pub mod store;

pub use backend::{BackendError, MemoryBackend, RangeRef, SheetBackend, StructuralRequest};
pub use encryption::{EncryptionError, Encryptor};
pub use quota::{OperationClass, QuotaExceededError, QuotaLimits, QuotaMonitor};
pub use schema::{ConversionError, Field, FieldType, Schema, SchemaError, Value};
pub use store::{Row, StoreError, TabularStore};
