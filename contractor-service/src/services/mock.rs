//! In-memory doubles for the record store and uploader.

use crate::services::formula::Formula;
use crate::services::record_store::{Fields, Record, RecordStore, StoreError, TableRef};
use crate::services::uploader::{UploadError, UploadedFile, Uploader};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Query,
    Insert,
    Update,
}

/// Record store backed by a map of tables, with per-table failure injection.
#[derive(Default)]
pub struct MockRecordStore {
    tables: Mutex<HashMap<TableRef, Vec<Record>>>,
    failures: Mutex<HashSet<(TableRef, MockOp)>>,
    next_id: AtomicU64,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row. `fields` must be a JSON object.
    pub fn seed(&self, table: &TableRef, id: &str, fields: Value) {
        let fields = match fields {
            Value::Object(map) => map,
            other => panic!("seed fields must be an object, got {other}"),
        };
        self.tables
            .lock()
            .unwrap()
            .entry(table.clone())
            .or_default()
            .push(Record {
                id: id.to_string(),
                fields,
                created_time: None,
            });
    }

    /// Makes every `op` against `table` fail with `StoreError::Unavailable`.
    pub fn fail_on(&self, table: &TableRef, op: MockOp) {
        self.failures.lock().unwrap().insert((table.clone(), op));
    }

    pub fn records(&self, table: &TableRef) -> Vec<Record> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn record(&self, table: &TableRef, id: &str) -> Option<Record> {
        self.records(table).into_iter().find(|r| r.id == id)
    }

    fn check(&self, table: &TableRef, op: MockOp) -> Result<(), StoreError> {
        if self.failures.lock().unwrap().contains(&(table.clone(), op)) {
            return Err(StoreError::Unavailable(format!("{:?} on {} failed", op, table)));
        }
        Ok(())
    }
}

/// Equality as the store evaluates it: lookup lists compare as their
/// elements joined with `", "` and numbers by their rendered form.
fn cell_matches(cell: Option<&Value>, literal: &str) -> bool {
    match cell {
        Some(Value::Array(items)) => {
            let joined: Vec<String> = items.iter().map(cell_text).collect();
            joined.join(", ") == literal
        }
        Some(other) => cell_text(other) == literal,
        None => literal.is_empty(),
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn query(
        &self,
        table: &TableRef,
        filter: Option<&Formula>,
    ) -> Result<Vec<Record>, StoreError> {
        self.check(table, MockOp::Query)?;
        let rows = self.records(table);
        Ok(match filter {
            Some(formula) => rows
                .into_iter()
                .filter(|r| cell_matches(r.fields.get(formula.field()), formula.value()))
                .collect(),
            None => rows,
        })
    }

    async fn insert(&self, table: &TableRef, fields: Fields) -> Result<Record, StoreError> {
        self.check(table, MockOp::Insert)?;
        let id = format!("rec{:014}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let record = Record {
            id,
            fields,
            created_time: Some(chrono::Utc::now().to_rfc3339()),
        };
        self.tables
            .lock()
            .unwrap()
            .entry(table.clone())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        table: &TableRef,
        id: &str,
        fields: Fields,
    ) -> Result<Record, StoreError> {
        self.check(table, MockOp::Update)?;
        let mut tables = self.tables.lock().unwrap();
        let record = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| StoreError::Api {
                status: 404,
                message: format!("record {} not found", id),
            })?;
        record.fields.extend(fields);
        Ok(record.clone())
    }
}

/// One call seen by [`MockUploader`].
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub local_path: PathBuf,
    pub file_name: String,
    pub folder_id: String,
    /// Size of the local file at upload time.
    pub size: u64,
}

/// Uploader that records calls and either succeeds or fails on demand.
#[derive(Default)]
pub struct MockUploader {
    fail: bool,
    uploads: Mutex<Vec<RecordedUpload>>,
}

impl MockUploader {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Uploader for MockUploader {
    async fn upload(
        &self,
        local_path: &Path,
        file_name: &str,
        folder_id: &str,
    ) -> Result<UploadedFile, UploadError> {
        let size = tokio::fs::metadata(local_path).await?.len();
        self.uploads.lock().unwrap().push(RecordedUpload {
            local_path: local_path.to_path_buf(),
            file_name: file_name.to_string(),
            folder_id: folder_id.to_string(),
            size,
        });

        if self.fail {
            return Err(UploadError::Rejected("mock uploader configured to fail".to_string()));
        }

        Ok(UploadedFile {
            id: format!("file-{}", self.uploads.lock().unwrap().len()),
            name: file_name.to_string(),
            web_view_link: Some(format!("https://drive.example.com/{}", file_name)),
        })
    }
}
