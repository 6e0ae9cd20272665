//! # Backend Errors
//!
//! Error types surfaced by transport implementations.

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors a transport collaborator may surface
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Backend unreachable or it rejected the call
    #[error("transport failure: {0}")]
    Transport(String),

    /// Container or table does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Optional capability absent in this deployment
    #[error("operation not supported by this backend: {0}")]
    Unsupported(String),
}
