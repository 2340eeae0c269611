//! Flattening of leader rows into the contractor picker format.
//!
//! Leader rows are maintained by hand, so the same column can hold a string,
//! a list (linked/lookup fields) or a number depending on the row. Each cell
//! is reduced to a string; a row with a cell we can't reduce is skipped on
//! its own without failing the listing.

use crate::services::record_store::Record;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const SUMMARY_FIELD: &str = "Summary";
pub const EMAIL_FIELD: &str = "Email (from Communit...";
pub const DATE_FIELD: &str = "Date";
pub const STATUS_FIELD: &str = "Status";
pub const PO_FIELD: &str = "PO";
pub const RATE_FIELD: &str = "Rate Formula";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractorSummary {
    pub id: String,
    pub summary: String,
    pub email: String,
    pub date: String,
    pub status: String,
    pub po: String,
    pub amount: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ContractorParseError {
    #[error("record has an empty id")]
    MissingId,

    #[error("field '{0}' has an unsupported shape")]
    UnsupportedShape(&'static str),
}

impl TryFrom<&Record> for ContractorSummary {
    type Error = ContractorParseError;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        if record.id.trim().is_empty() {
            return Err(ContractorParseError::MissingId);
        }

        let amount = cell_text(record, RATE_FIELD)?;
        let amount = normalize_amount(&amount);

        Ok(ContractorSummary {
            id: record.id.clone(),
            summary: cell_text(record, SUMMARY_FIELD)?,
            email: cell_text(record, EMAIL_FIELD)?,
            date: cell_text(record, DATE_FIELD)?,
            status: cell_text(record, STATUS_FIELD)?,
            po: cell_text(record, PO_FIELD)?,
            amount,
        })
    }
}

/// Converts every record it can, logging and skipping the rest.
pub fn summarize(records: &[Record]) -> Vec<ContractorSummary> {
    records
        .iter()
        .filter_map(|record| match ContractorSummary::try_from(record) {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!(record_id = %record.id, error = %e, "Skipping contractor record");
                None
            }
        })
        .collect()
}

fn cell_text(record: &Record, field: &'static str) -> Result<String, ContractorParseError> {
    scalar_text(record.fields.get(field)).ok_or(ContractorParseError::UnsupportedShape(field))
}

/// Missing/null -> "", scalars as text, lists -> their first element.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => Some(String::new()),
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(Value::Array(items)) => match items.first() {
            Some(Value::Array(_)) => None,
            first => scalar_text(first),
        },
        Some(Value::Object(_)) => None,
    }
}

/// `"$3,000.00"` -> `"3000.00"`: currency symbols and separators are removed,
/// the digits are left as written.
fn normalize_amount(raw: &str) -> String {
    raw.replace(['$', ','], "").trim().to_string()
}
