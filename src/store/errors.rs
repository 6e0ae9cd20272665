//! # Store Errors
//!
//! Unified error type for the CRUD engine. Validation and encryption errors
//! are raised before any backend call; backend errors surface unwrapped
//! except the documented container-delete fallback in `destroy`.

use thiserror::Error;

use crate::backend::BackendError;
use crate::encryption::EncryptionError;
use crate::quota::QuotaExceededError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by [`TabularStore`](super::TabularStore) operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// A schema rule was violated: missing required field, duplicate unique
    /// value, unparsable type, or an unknown field name
    #[error("validation failed: {0}")]
    Validation(String),

    /// Field-level encryption or decryption failed
    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    /// The local rate window is exhausted
    #[error(transparent)]
    QuotaExceeded(#[from] QuotaExceededError),

    /// The backend was unreachable, rejected the call, or the addressed
    /// container does not exist
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The store is unbound or destroyed
    #[error("no table: create_table has not been called or the table was destroyed")]
    NoTable,
}
