//! Backend transport boundary.
//!
//! The store talks to the remote spreadsheet only through [`SheetBackend`],
//! an explicitly passed handle injected at construction. Credential
//! acquisition and the concrete wire protocol belong to implementations of
//! this trait, not to the store.
//!
//! Persisted layout convention every implementation must honor:
//! row 1 = field names in schema order, rows 2..N = data in the same column
//! order, empty cell = absent value.

mod errors;
pub mod memory;

pub use errors::{BackendError, BackendResult};
pub use memory::MemoryBackend;

use async_trait::async_trait;

/// Addresses a cell range inside a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeRef {
    /// The whole table, header row included
    Table(String),
    /// One 1-based row of a table (row 1 is the header)
    Row { table: String, row: u64 },
}

/// Structural mutations applied through a single batch call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralRequest {
    /// Rename the container; metadata only, no row data touched
    RenameContainer { title: String },
    /// Delete a row dimension. Indices are 0-based and end-exclusive,
    /// counted over the backend grid (the header row is index 0).
    DeleteRows {
        table_id: i64,
        start_index: u64,
        end_index: u64,
    },
}

/// Capability contract required from the transport collaborator.
///
/// All calls are potentially blocking network operations; they are async so
/// the caller can await or cancel them without blocking unrelated work. A
/// write already submitted cannot be rolled back by cancellation.
#[async_trait]
pub trait SheetBackend: Send + Sync {
    /// Creates a container holding one table seeded with the header row.
    /// Returns the new container's id.
    async fn create_container(
        &self,
        title: &str,
        table_name: &str,
        header: Vec<String>,
    ) -> BackendResult<String>;

    /// Appends one row of cells after the current last row.
    async fn append_row(
        &self,
        container: &str,
        range: &RangeRef,
        values: Vec<String>,
    ) -> BackendResult<()>;

    /// Fetches a range as a 2-D array of cell strings.
    async fn get_range(&self, container: &str, range: &RangeRef) -> BackendResult<Vec<Vec<String>>>;

    /// Overwrites a range with the given cell strings.
    async fn update_range(
        &self,
        container: &str,
        range: &RangeRef,
        values: Vec<Vec<String>>,
    ) -> BackendResult<()>;

    /// Applies structural requests in order.
    async fn batch_structural_update(
        &self,
        container: &str,
        requests: Vec<StructuralRequest>,
    ) -> BackendResult<()>;

    /// Resolves a table's internal numeric id, distinct from its logical
    /// name; required for row-dimension deletes.
    async fn resolve_table_id(&self, container: &str, table_name: &str) -> BackendResult<i64>;

    /// Deletes the whole container. May be `Unsupported` in some
    /// deployments; callers fall back to clearing row content.
    async fn delete_container(&self, container: &str) -> BackendResult<()>;
}
