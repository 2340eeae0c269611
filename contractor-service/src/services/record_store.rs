//! Record-store abstraction over the hosted tabular database.
//!
//! Rows are addressed by a base/table pair and carry an opaque id plus a
//! free-form field map. The Airtable client and the in-memory mock both
//! implement [`RecordStore`], so the invoice workflow never sees HTTP.

use crate::services::formula::Formula;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Field map of a single row.
pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub base: String,
    pub table: String,
}

impl TableRef {
    pub fn new(base: &str, table: &str) -> Self {
        Self {
            base: base.to_string(),
            table: table.to_string(),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.table)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(default)]
    pub fields: Fields,
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("record store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected record store response: {0}")]
    Decode(String),

    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for service_core::error::AppError {
    fn from(err: StoreError) -> Self {
        service_core::error::AppError::BadGateway(err.to_string())
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Rows of `table` matching `filter`, or every row when `filter` is `None`.
    async fn query(
        &self,
        table: &TableRef,
        filter: Option<&Formula>,
    ) -> Result<Vec<Record>, StoreError>;

    async fn insert(&self, table: &TableRef, fields: Fields) -> Result<Record, StoreError>;

    /// Patch semantics: fields not named are left untouched.
    async fn update(&self, table: &TableRef, id: &str, fields: Fields)
        -> Result<Record, StoreError>;
}
