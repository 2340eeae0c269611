use crate::services::invoice_workflow::{InvoiceOutcome, StepFailure};
use crate::services::{Record, UploadedFile};
use serde::Serialize;

/// `/invoice` reply: the outcome of every step, including the ones that
/// degraded.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub status: &'static str,
    pub ledger_record: Record,
    pub leaders_updated: u32,
    pub purchase_orders_updated: u32,
    pub upload: Option<UploadedFile>,
    pub failures: Vec<StepFailure>,
}

impl From<InvoiceOutcome> for InvoiceResponse {
    fn from(outcome: InvoiceOutcome) -> Self {
        Self {
            status: "success",
            ledger_record: outcome.ledger_record,
            leaders_updated: outcome.leaders_updated,
            purchase_orders_updated: outcome.purchase_orders_updated,
            upload: outcome.upload,
            failures: outcome.failures,
        }
    }
}
