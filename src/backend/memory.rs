//! In-process backend.
//!
//! Implements the transport contract against process-local state. Backs the
//! test suite and local development; shares state across clones so a test
//! can hand one clone to a store and inspect raw cells through another.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{BackendError, BackendResult, RangeRef, SheetBackend, StructuralRequest};

#[derive(Debug, Default)]
struct MemTable {
    id: i64,
    name: String,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Default)]
struct Container {
    title: String,
    tables: Vec<MemTable>,
}

#[derive(Debug, Default)]
struct State {
    containers: HashMap<String, Container>,
    next_container: u64,
}

/// In-memory implementation of [`SheetBackend`]
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
    deny_container_delete: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose `delete_container` reports `Unsupported`, matching
    /// deployments where container deletion is not authorized.
    pub fn with_container_delete_denied() -> Self {
        Self {
            deny_container_delete: true,
            ..Self::default()
        }
    }

    /// Raw cells of a table, header row included. Inspection helper.
    pub fn raw_rows(&self, container: &str, table_name: &str) -> Option<Vec<Vec<String>>> {
        let state = self.lock().ok()?;
        let container = state.containers.get(container)?;
        container
            .tables
            .iter()
            .find(|t| t.name == table_name)
            .map(|t| t.rows.clone())
    }

    /// Current container title. Inspection helper.
    pub fn container_title(&self, container: &str) -> Option<String> {
        let state = self.lock().ok()?;
        state.containers.get(container).map(|c| c.title.clone())
    }

    fn lock(&self) -> BackendResult<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| BackendError::Transport("backend state lock poisoned".into()))
    }
}

fn table_mut<'a>(container: &'a mut Container, name: &str) -> BackendResult<&'a mut MemTable> {
    container
        .tables
        .iter_mut()
        .find(|t| t.name == name)
        .ok_or_else(|| BackendError::NotFound(format!("table '{}'", name)))
}

fn range_table(range: &RangeRef) -> &str {
    match range {
        RangeRef::Table(name) => name,
        RangeRef::Row { table, .. } => table,
    }
}

#[async_trait]
impl SheetBackend for MemoryBackend {
    async fn create_container(
        &self,
        title: &str,
        table_name: &str,
        header: Vec<String>,
    ) -> BackendResult<String> {
        let mut state = self.lock()?;
        state.next_container += 1;
        let id = format!("container-{}", state.next_container);
        state.containers.insert(
            id.clone(),
            Container {
                title: title.to_string(),
                tables: vec![MemTable {
                    id: 0,
                    name: table_name.to_string(),
                    rows: vec![header],
                }],
            },
        );
        Ok(id)
    }

    async fn append_row(
        &self,
        container: &str,
        range: &RangeRef,
        values: Vec<String>,
    ) -> BackendResult<()> {
        let mut state = self.lock()?;
        let container = state
            .containers
            .get_mut(container)
            .ok_or_else(|| BackendError::NotFound(format!("container '{}'", container)))?;
        let table = table_mut(container, range_table(range))?;
        table.rows.push(values);
        Ok(())
    }

    async fn get_range(&self, container: &str, range: &RangeRef) -> BackendResult<Vec<Vec<String>>> {
        let state = self.lock()?;
        let container = state
            .containers
            .get(container)
            .ok_or_else(|| BackendError::NotFound(format!("container '{}'", container)))?;
        let table = container
            .tables
            .iter()
            .find(|t| t.name == range_table(range))
            .ok_or_else(|| BackendError::NotFound(format!("table '{}'", range_table(range))))?;
        match range {
            RangeRef::Table(_) => Ok(table.rows.clone()),
            RangeRef::Row { row, .. } => {
                let idx = (*row as usize)
                    .checked_sub(1)
                    .filter(|i| *i < table.rows.len())
                    .ok_or_else(|| BackendError::NotFound(format!("row {}", row)))?;
                Ok(vec![table.rows[idx].clone()])
            }
        }
    }

    async fn update_range(
        &self,
        container: &str,
        range: &RangeRef,
        values: Vec<Vec<String>>,
    ) -> BackendResult<()> {
        let mut state = self.lock()?;
        let container = state
            .containers
            .get_mut(container)
            .ok_or_else(|| BackendError::NotFound(format!("container '{}'", container)))?;
        let table = table_mut(container, range_table(range))?;
        match range {
            RangeRef::Row { row, .. } => {
                let idx = (*row as usize)
                    .checked_sub(1)
                    .filter(|i| *i < table.rows.len())
                    .ok_or_else(|| BackendError::NotFound(format!("row {}", row)))?;
                if let Some(cells) = values.into_iter().next() {
                    table.rows[idx] = cells;
                }
                Ok(())
            }
            RangeRef::Table(_) => {
                table.rows = values;
                Ok(())
            }
        }
    }

    async fn batch_structural_update(
        &self,
        container: &str,
        requests: Vec<StructuralRequest>,
    ) -> BackendResult<()> {
        let mut state = self.lock()?;
        let container = state
            .containers
            .get_mut(container)
            .ok_or_else(|| BackendError::NotFound(format!("container '{}'", container)))?;
        for request in requests {
            match request {
                StructuralRequest::RenameContainer { title } => {
                    container.title = title;
                }
                StructuralRequest::DeleteRows {
                    table_id,
                    start_index,
                    end_index,
                } => {
                    let table = container
                        .tables
                        .iter_mut()
                        .find(|t| t.id == table_id)
                        .ok_or_else(|| {
                            BackendError::NotFound(format!("table id {}", table_id))
                        })?;
                    let start = start_index as usize;
                    let end = (end_index as usize).min(table.rows.len());
                    if start >= end {
                        return Err(BackendError::NotFound(format!(
                            "row range {}..{}",
                            start_index, end_index
                        )));
                    }
                    table.rows.drain(start..end);
                }
            }
        }
        Ok(())
    }

    async fn resolve_table_id(&self, container: &str, table_name: &str) -> BackendResult<i64> {
        let state = self.lock()?;
        let container = state
            .containers
            .get(container)
            .ok_or_else(|| BackendError::NotFound(format!("container '{}'", container)))?;
        container
            .tables
            .iter()
            .find(|t| t.name == table_name)
            .map(|t| t.id)
            .ok_or_else(|| BackendError::NotFound(format!("table '{}'", table_name)))
    }

    async fn delete_container(&self, container: &str) -> BackendResult<()> {
        if self.deny_container_delete {
            return Err(BackendError::Unsupported("deleteContainer".into()));
        }
        let mut state = self.lock()?;
        state
            .containers
            .remove(container)
            .map(|_| ())
            .ok_or_else(|| BackendError::NotFound(format!("container '{}'", container)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Vec<String> {
        vec!["id".into(), "name".into()]
    }

    #[tokio::test]
    async fn test_create_seeds_header_row() {
        let backend = MemoryBackend::new();
        let id = backend
            .create_container("Title", "users", header())
            .await
            .unwrap();
        let rows = backend
            .get_range(&id, &RangeRef::Table("users".into()))
            .await
            .unwrap();
        assert_eq!(rows, vec![vec!["id".to_string(), "name".to_string()]]);
    }

    #[tokio::test]
    async fn test_append_and_row_update() {
        let backend = MemoryBackend::new();
        let id = backend
            .create_container("Title", "users", header())
            .await
            .unwrap();
        let table = RangeRef::Table("users".into());
        backend
            .append_row(&id, &table, vec!["1".into(), "Alice".into()])
            .await
            .unwrap();
        backend
            .update_range(
                &id,
                &RangeRef::Row {
                    table: "users".into(),
                    row: 2,
                },
                vec![vec!["1".into(), "Bob".into()]],
            )
            .await
            .unwrap();
        let rows = backend.get_range(&id, &table).await.unwrap();
        assert_eq!(rows[1], vec!["1".to_string(), "Bob".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_rows_by_dimension() {
        let backend = MemoryBackend::new();
        let id = backend
            .create_container("Title", "users", header())
            .await
            .unwrap();
        let table = RangeRef::Table("users".into());
        for n in 1..=3 {
            backend
                .append_row(&id, &table, vec![n.to_string(), format!("user{}", n)])
                .await
                .unwrap();
        }
        let table_id = backend.resolve_table_id(&id, "users").await.unwrap();
        // Delete grid row index 1 (first data row)
        backend
            .batch_structural_update(
                &id,
                vec![StructuralRequest::DeleteRows {
                    table_id,
                    start_index: 1,
                    end_index: 2,
                }],
            )
            .await
            .unwrap();
        let rows = backend.get_range(&id, &table).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0], "2");
    }

    #[tokio::test]
    async fn test_rename_container() {
        let backend = MemoryBackend::new();
        let id = backend
            .create_container("Old", "users", header())
            .await
            .unwrap();
        backend
            .batch_structural_update(
                &id,
                vec![StructuralRequest::RenameContainer {
                    title: "New".into(),
                }],
            )
            .await
            .unwrap();
        assert_eq!(backend.container_title(&id).unwrap(), "New");
    }

    #[tokio::test]
    async fn test_missing_container_is_not_found() {
        let backend = MemoryBackend::new();
        let err = backend
            .get_range("nope", &RangeRef::Table("users".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_container_delete_can_be_denied() {
        let backend = MemoryBackend::with_container_delete_denied();
        let id = backend
            .create_container("Title", "users", header())
            .await
            .unwrap();
        let err = backend.delete_container(&id).await.unwrap_err();
        assert!(matches!(err, BackendError::Unsupported(_)));
    }
}
