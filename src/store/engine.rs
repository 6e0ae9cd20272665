//! The CRUD engine.
//!
//! Translates row-oriented operations into range-level backend calls:
//! validate through the schema, encrypt marked fields, rate-check every
//! round trip, then read or mutate flat cell ranges and translate results
//! back to row maps.
//!
//! # Concurrency
//!
//! Single-writer assumed. The backend has no row ids, indexes, or
//! transactions, so `update` and `delete` address rows by their current
//! position; a concurrent writer mutating the table between the positional
//! read and the positional write can shift rows and corrupt addressing.
//! This is a documented limitation, not masked. Callers needing in-process
//! serialization should wrap the store in their own mutex.

use tracing::{debug, info};

use crate::backend::{BackendError, RangeRef, SheetBackend, StructuralRequest};
use crate::encryption::Encryptor;
use crate::quota::{OperationClass, QuotaLimits, QuotaMonitor};
use crate::schema::{coerce, Schema};

use super::errors::{StoreError, StoreResult};
use super::filters;
use super::Row;

/// Lifecycle of the logical table behind a store
enum TableState {
    /// No container yet; only `create_table` is useful
    Unbound,
    /// Bound to a container
    Ready(String),
    /// `destroy` completed; all further operations fail
    Destroyed,
}

/// Schema-enforced CRUD over one logical table in a remote backend
pub struct TabularStore<B: SheetBackend> {
    backend: B,
    schema: Schema,
    encryptor: Option<Encryptor>,
    quota: QuotaMonitor,
    state: TableState,
}

impl<B: SheetBackend> TabularStore<B> {
    /// Creates an unbound store over the given backend and schema.
    pub fn new(backend: B, schema: Schema) -> Self {
        Self {
            backend,
            schema,
            encryptor: None,
            quota: QuotaMonitor::default(),
            state: TableState::Unbound,
        }
    }

    /// Enables field-level encryption for fields marked `encrypted`.
    pub fn with_encryptor(mut self, encryptor: Encryptor) -> Self {
        self.encryptor = Some(encryptor);
        self
    }

    /// Convenience for `with_encryptor(Encryptor::new(Some(key)))`.
    pub fn with_encryption_key(self, key: &str) -> Self {
        self.with_encryptor(Encryptor::new(Some(key)))
    }

    /// Overrides the default per-class quota limits.
    pub fn with_quota_limits(mut self, limits: QuotaLimits) -> Self {
        self.quota = QuotaMonitor::new(limits);
        self
    }

    /// The schema this store enforces.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The bound container id, if the store is ready.
    pub fn container_id(&self) -> Option<&str> {
        match &self.state {
            TableState::Ready(id) => Some(id),
            _ => None,
        }
    }

    fn container(&self) -> StoreResult<&str> {
        match &self.state {
            TableState::Ready(id) => Ok(id),
            _ => Err(StoreError::NoTable),
        }
    }

    /// Creates the backend container seeded with the schema's header row and
    /// binds this store to it. Returns the container id.
    pub async fn create_table(&mut self, title: &str) -> StoreResult<String> {
        self.quota.check(OperationClass::Write)?;
        let id = self
            .backend
            .create_container(title, self.schema.name(), self.schema.header())
            .await?;
        info!(container = %id, table = self.schema.name(), "created table");
        self.state = TableState::Ready(id.clone());
        Ok(id)
    }

    /// Validates, coerces, encrypts, and appends one row.
    ///
    /// Unique fields trigger a pre-scan of existing rows; a collision is a
    /// validation error and nothing is written. Validation and encryption
    /// complete before the append, so a failure has no backend side effect;
    /// the append itself needs no prior row count and is safe to retry.
    pub async fn insert(&self, data: Row) -> StoreResult<()> {
        let container = self.container()?.to_string();
        let resolved = self.resolve_row(&data)?;

        let unique_fields: Vec<_> = self.schema.fields().iter().filter(|f| f.unique).collect();
        if unique_fields.iter().any(|f| resolved.contains_key(&f.name)) {
            let existing = self.fetch_rows(&container).await?;
            for field in unique_fields {
                let candidate = match resolved.get(&field.name) {
                    Some(v) => v.to_wire(),
                    None => continue,
                };
                let collision = existing.iter().any(|row| {
                    row.get(&field.name)
                        .map(|v| v.to_wire() == candidate)
                        .unwrap_or(false)
                });
                if collision {
                    return Err(StoreError::Validation(format!(
                        "duplicate value '{}' for unique field '{}'",
                        candidate, field.name
                    )));
                }
            }
        }

        let cells = self.encode_row(&resolved)?;
        self.quota.check(OperationClass::Write)?;
        self.backend
            .append_row(&container, &self.table_range(), cells)
            .await?;
        debug!(table = self.schema.name(), "inserted row");
        Ok(())
    }

    /// Reads all rows, optionally keeping only those matching the filters.
    ///
    /// Always a fresh full scan; no cache, no index. Filter comparison is
    /// equality on the wire-string form of both sides.
    pub async fn read(&self, filters: Option<&Row>) -> StoreResult<Vec<Row>> {
        let container = self.container()?.to_string();
        let rows = self.fetch_rows(&container).await?;
        Ok(match filters {
            Some(f) if !f.is_empty() => rows
                .into_iter()
                .filter(|row| filters::matches(row, f))
                .collect(),
            _ => rows,
        })
    }

    /// Merges `updates` into every row matching `filters`, re-validates the
    /// merged rows, and overwrites them in place. Returns the number of rows
    /// overwritten; zero matches means zero writes.
    ///
    /// All merged rows are validated and encoded before the first write, so
    /// a validation failure leaves the table untouched by this call.
    pub async fn update(&self, filters: &Row, updates: &Row) -> StoreResult<usize> {
        let container = self.container()?.to_string();
        for key in updates.keys() {
            if self.schema.field(key).is_none() {
                return Err(StoreError::Validation(format!("unknown field '{}'", key)));
            }
        }

        let matched = self.resolve_matches(&container, filters).await?;
        if matched.is_empty() {
            return Ok(0);
        }

        let mut writes = Vec::with_capacity(matched.len());
        for (row_number, existing) in &matched {
            let mut merged = existing.clone();
            for (key, value) in updates {
                merged.insert(key.clone(), value.clone());
            }
            let resolved = self.resolve_row(&merged)?;
            writes.push((*row_number, self.encode_row(&resolved)?));
        }

        let count = writes.len();
        for (row_number, cells) in writes {
            self.quota.check(OperationClass::Write)?;
            self.backend
                .update_range(&container, &self.row_range(row_number), vec![cells])
                .await?;
        }
        info!(table = self.schema.name(), count, "updated rows");
        Ok(count)
    }

    /// Deletes every row matching `filters`. Returns the number removed.
    pub async fn delete(&self, filters: &Row) -> StoreResult<usize> {
        let container = self.container()?.to_string();
        let matched = self.resolve_matches(&container, filters).await?;
        if matched.is_empty() {
            return Ok(0);
        }

        self.quota.check(OperationClass::Read)?;
        let table_id = self
            .backend
            .resolve_table_id(&container, self.schema.name())
            .await?;

        let mut row_numbers: Vec<u64> = matched.into_iter().map(|(n, _)| n).collect();
        // Descending order is mandatory: deleting a lower row first shifts
        // every later row number up by one and the wrong rows get deleted.
        row_numbers.sort_unstable_by(|a, b| b.cmp(a));

        let requests = row_numbers
            .iter()
            .map(|n| StructuralRequest::DeleteRows {
                table_id,
                start_index: n - 1,
                end_index: *n,
            })
            .collect();
        self.quota.check(OperationClass::Write)?;
        self.backend
            .batch_structural_update(&container, requests)
            .await?;
        info!(
            table = self.schema.name(),
            count = row_numbers.len(),
            "deleted rows"
        );
        Ok(row_numbers.len())
    }

    /// Renames the container. Metadata only, no row data touched.
    pub async fn rename(&self, new_title: &str) -> StoreResult<()> {
        let container = self.container()?.to_string();
        self.quota.check(OperationClass::Write)?;
        self.backend
            .batch_structural_update(
                &container,
                vec![StructuralRequest::RenameContainer {
                    title: new_title.to_string(),
                }],
            )
            .await?;
        info!(container = %container, title = new_title, "renamed container");
        Ok(())
    }

    /// Destroys the table. Prefers deleting the whole container; where that
    /// capability is unsupported, falls back to clearing all data rows below
    /// the header. Either way the store ends Destroyed and every further
    /// operation fails with a no-table error.
    pub async fn destroy(&mut self) -> StoreResult<()> {
        let container = self.container()?.to_string();
        self.quota.check(OperationClass::Write)?;
        match self.backend.delete_container(&container).await {
            Ok(()) => {}
            Err(BackendError::Unsupported(capability)) => {
                debug!(%capability, "container delete unavailable, clearing rows instead");
                self.clear_data_rows(&container).await?;
            }
            Err(e) => return Err(e.into()),
        }
        self.state = TableState::Destroyed;
        info!(container = %container, "table destroyed");
        Ok(())
    }

    /// Content-clear fallback for `destroy`: drops rows 2..N, keeps the header.
    async fn clear_data_rows(&self, container: &str) -> StoreResult<()> {
        self.quota.check(OperationClass::Read)?;
        let grid = self
            .backend
            .get_range(container, &self.table_range())
            .await?;
        if grid.len() <= 1 {
            return Ok(());
        }
        self.quota.check(OperationClass::Read)?;
        let table_id = self
            .backend
            .resolve_table_id(container, self.schema.name())
            .await?;
        self.quota.check(OperationClass::Write)?;
        self.backend
            .batch_structural_update(
                container,
                vec![StructuralRequest::DeleteRows {
                    table_id,
                    start_index: 1,
                    end_index: grid.len() as u64,
                }],
            )
            .await?;
        Ok(())
    }

    /// Resolves "logical match" to "backend row number" in one fetch.
    ///
    /// Row identity is purely positional, so this is the single place that
    /// turns a filter match into an address (`data index + 2`: 1-based
    /// numbering plus the header row). Keeping match and address in one read
    /// keeps the row-shift race window to a single round trip.
    async fn resolve_matches(
        &self,
        container: &str,
        filters: &Row,
    ) -> StoreResult<Vec<(u64, Row)>> {
        let rows = self.fetch_rows(container).await?;
        Ok(rows
            .into_iter()
            .enumerate()
            .filter(|(_, row)| filters::matches(row, filters))
            .map(|(i, row)| (i as u64 + 2, row))
            .collect())
    }

    /// Fetches and decodes all data rows, in backend order.
    async fn fetch_rows(&self, container: &str) -> StoreResult<Vec<Row>> {
        self.quota.check(OperationClass::Read)?;
        let grid = self
            .backend
            .get_range(container, &self.table_range())
            .await?;
        let mut rows = grid.into_iter();
        let header = match rows.next() {
            Some(h) => h,
            None => return Ok(Vec::new()),
        };
        rows.map(|cells| self.decode_row(&header, &cells)).collect()
    }

    /// Validates `data` against the schema and produces the typed row:
    /// every value coerced to its declared type, defaults substituted for
    /// absent fields that declare one. All field errors are collected and
    /// raised together.
    fn resolve_row(&self, data: &Row) -> StoreResult<Row> {
        let mut problems = Vec::new();

        for key in data.keys() {
            if self.schema.field(key).is_none() {
                problems.push(format!("unknown field '{}'", key));
            }
        }

        let mut resolved = Row::new();
        for field in self.schema.fields() {
            let value = data.get(&field.name);
            let errors = self.schema.validate_value(&field.name, value);
            if !errors.is_empty() {
                problems.extend(errors);
                continue;
            }
            let source = match value {
                Some(v) => Some(v.clone()),
                None => field.default.clone(),
            };
            if let Some(v) = source {
                match coerce::coerce(&v, field.field_type) {
                    Ok(coerced) => {
                        resolved.insert(field.name.clone(), coerced);
                    }
                    Err(e) => problems.push(format!("field '{}': {}", field.name, e)),
                }
            }
        }

        if !problems.is_empty() {
            return Err(StoreError::Validation(problems.join("; ")));
        }
        Ok(resolved)
    }

    /// Encodes a resolved row into positional cells in schema field order.
    /// Absent optional fields become empty cells.
    fn encode_row(&self, resolved: &Row) -> StoreResult<Vec<String>> {
        let mut cells = Vec::with_capacity(self.schema.fields().len());
        for field in self.schema.fields() {
            let cell = match resolved.get(&field.name) {
                None => String::new(),
                Some(value) => match (&self.encryptor, field.encrypted) {
                    (Some(encryptor), true) => encryptor.encrypt(&coerce::to_json(value))?,
                    _ => value.to_wire(),
                },
            };
            cells.push(cell);
        }
        Ok(cells)
    }

    /// Decodes one positional cell row into a row map, driven by the stored
    /// header. Short rows are padded with empty cells; an empty cell is an
    /// absent field. Header names unknown to the schema are skipped.
    fn decode_row(&self, header: &[String], cells: &[String]) -> StoreResult<Row> {
        let mut row = Row::new();
        for (i, name) in header.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            if cell.is_empty() {
                continue;
            }
            let field = match self.schema.field(name) {
                Some(f) => f,
                None => continue,
            };
            let value = match (&self.encryptor, field.encrypted) {
                (Some(encryptor), true) => {
                    let json = encryptor.decrypt(cell)?;
                    if json.is_null() {
                        continue;
                    }
                    coerce::from_json(&json, field.field_type)
                        .map_err(|e| StoreError::Validation(e.to_string()))?
                }
                _ => coerce::parse_wire(cell, field.field_type)
                    .map_err(|e| StoreError::Validation(e.to_string()))?,
            };
            row.insert(name.clone(), value);
        }
        Ok(row)
    }

    fn table_range(&self) -> RangeRef {
        RangeRef::Table(self.schema.name().to_string())
    }

    fn row_range(&self, row: u64) -> RangeRef {
        RangeRef::Row {
            table: self.schema.name().to_string(),
            row,
        }
    }
}
