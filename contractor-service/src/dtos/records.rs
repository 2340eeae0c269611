use crate::services::Record;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw ledger row, written as sent.
#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    #[serde(default)]
    pub record: Option<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub status: &'static str,
    pub record: Record,
}
