//! Invoice processing across the ledger, leader and purchase-order tables.
//!
//! Steps run in a fixed order:
//!
//! 1. insert a ledger row (the only fatal step),
//! 2. mark the contractor's leader row as "Payment requested",
//! 3. decrement the purchase order balance,
//! 4. copy the invoice PDF to remote storage.
//!
//! Writes are not atomic across tables. When a later step fails the earlier
//! writes stay committed; the failure is logged and reported in
//! [`InvoiceOutcome::failures`] rather than returned as an error.
//! Submissions are not deduplicated: posting the same invoice twice creates
//! two ledger rows and decrements the balance twice.

use crate::config::TablesConfig;
use crate::models::InvoicePayload;
use crate::services::balance::{adjust_balance, parse_balance};
use crate::services::fetcher::AttachmentFetcher;
use crate::services::lookup::find_first;
use crate::services::record_store::{Fields, Record, RecordStore, StoreError};
use crate::services::uploader::{UploadError, UploadedFile, Uploader};
use metrics::counter;
use serde::Serialize;
use serde_json::{json, Value};
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;

/// Status written to a leader row once an invoice has been submitted.
pub const PAYMENT_REQUESTED_STATUS: &str = "Payment requested";

pub mod fields {
    pub const PAYMENT_NAME: &str = "Payment Name";
    pub const INVOICE_DATE: &str = "Invoice Date";
    pub const DESCRIPTION: &str = "Description";
    pub const TOTAL_PAYMENT: &str = "Total Payment";
    pub const PURCHASE_ORDERS: &str = "Purchase Orders";

    pub const STATUS: &str = "Status";
    pub const INVOICE: &str = "Invoice";

    pub const ORDERS: &str = "Orders";
    pub const BALANCE: &str = "Balance";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    LedgerInsert,
    LeaderUpdate,
    PurchaseOrderUpdate,
    Upload,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::LedgerInsert => "ledger_insert",
            WorkflowStep::LeaderUpdate => "leader_update",
            WorkflowStep::PurchaseOrderUpdate => "purchase_order_update",
            WorkflowStep::Upload => "upload",
        }
    }
}

/// A non-fatal step that did not complete.
#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    pub step: WorkflowStep,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceOutcome {
    pub ledger_record: Record,
    pub leaders_updated: u32,
    pub purchase_orders_updated: u32,
    pub upload: Option<UploadedFile>,
    pub failures: Vec<StepFailure>,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("ledger insert failed: {0}")]
    Ledger(#[source] StoreError),
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        AppError::BadGateway(err.to_string())
    }
}

/// Where invoice PDFs are copied to.
#[derive(Clone)]
pub struct UploadTarget {
    pub uploader: Arc<dyn Uploader>,
    pub folder_id: String,
}

#[derive(Clone)]
pub struct InvoiceWorkflow {
    store: Arc<dyn RecordStore>,
    tables: TablesConfig,
    upload: Option<UploadTarget>,
    fetcher: AttachmentFetcher,
}

impl InvoiceWorkflow {
    pub fn new(
        store: Arc<dyn RecordStore>,
        tables: TablesConfig,
        upload: Option<UploadTarget>,
        fetcher: AttachmentFetcher,
    ) -> Self {
        Self {
            store,
            tables,
            upload,
            fetcher,
        }
    }

    pub async fn process(&self, payload: &InvoicePayload) -> Result<InvoiceOutcome, WorkflowError> {
        let ledger_record = self.insert_ledger_row(payload).await.map_err(|e| {
            tracing::error!(
                payment_name = %payload.payment_name,
                error = %e,
                "Ledger insert failed; aborting invoice"
            );
            counter!("invoice_step_failures_total", "step" => WorkflowStep::LedgerInsert.as_str())
                .increment(1);
            WorkflowError::Ledger(e)
        })?;

        let mut failures = Vec::new();

        let leaders_updated = match self.update_leader(payload).await {
            Ok(count) => count,
            Err(e) => {
                record_failure(&mut failures, WorkflowStep::LeaderUpdate, &e);
                0
            }
        };

        let purchase_orders_updated = match self.update_purchase_order(payload).await {
            Ok(count) => count,
            Err(e) => {
                record_failure(&mut failures, WorkflowStep::PurchaseOrderUpdate, &e);
                0
            }
        };

        let upload = match self.upload_invoice(payload).await {
            Ok(file) => file,
            Err(e) => {
                record_failure(&mut failures, WorkflowStep::Upload, &e);
                None
            }
        };

        counter!("invoices_processed_total").increment(1);
        tracing::info!(
            ledger_record_id = %ledger_record.id,
            leaders_updated,
            purchase_orders_updated,
            uploaded = upload.is_some(),
            failures = failures.len(),
            "Invoice processed"
        );

        Ok(InvoiceOutcome {
            ledger_record,
            leaders_updated,
            purchase_orders_updated,
            upload,
            failures,
        })
    }

    async fn insert_ledger_row(&self, payload: &InvoicePayload) -> Result<Record, StoreError> {
        let mut row = Fields::new();
        row.insert(fields::PAYMENT_NAME.into(), json!(payload.payment_name));
        row.insert(fields::INVOICE_DATE.into(), json!(payload.invoice_date));
        row.insert(fields::DESCRIPTION.into(), json!(payload.description));
        row.insert(fields::TOTAL_PAYMENT.into(), json!(payload.total_payment));
        row.insert(fields::PURCHASE_ORDERS.into(), json!(payload.purchase_order));

        self.store.insert(&self.tables.ledger, row).await
    }

    async fn update_leader(&self, payload: &InvoicePayload) -> Result<u32, StoreError> {
        let leader = find_first(
            self.store.as_ref(),
            &self.tables.leaders,
            &self.tables.leader_email_field,
            &payload.email,
        )
        .await?;

        let Some(leader) = leader else {
            tracing::info!(email = %payload.email, "No leader row for invoice email; skipping status update");
            return Ok(0);
        };

        let mut update = Fields::new();
        update.insert(fields::STATUS.into(), json!(PAYMENT_REQUESTED_STATUS));
        if let Some(url) = payload.pdf_url() {
            update.insert(fields::INVOICE.into(), json!([{ "url": url }]));
        }

        self.store
            .update(&self.tables.leaders, &leader.id, update)
            .await?;
        Ok(1)
    }

    async fn update_purchase_order(&self, payload: &InvoicePayload) -> Result<u32, StoreError> {
        let order = find_first(
            self.store.as_ref(),
            &self.tables.purchase_orders,
            fields::ORDERS,
            &payload.purchase_order,
        )
        .await?;

        let Some(order) = order else {
            tracing::info!(
                purchase_order = %payload.purchase_order,
                "No purchase order row; skipping balance update"
            );
            return Ok(0);
        };

        let current = parse_balance(order.fields.get(fields::BALANCE));
        let balance = adjust_balance(current, payload.total_payment);

        let mut update = Fields::new();
        update.insert(fields::BALANCE.into(), Value::from(balance));

        self.store
            .update(&self.tables.purchase_orders, &order.id, update)
            .await?;

        tracing::info!(
            purchase_order = %payload.purchase_order,
            record_id = %order.id,
            previous_balance = current,
            balance,
            "Purchase order balance adjusted"
        );
        Ok(1)
    }

    async fn upload_invoice(
        &self,
        payload: &InvoicePayload,
    ) -> Result<Option<UploadedFile>, UploadError> {
        let Some(url) = payload.pdf_url() else {
            return Ok(None);
        };
        let Some(target) = &self.upload else {
            tracing::debug!("Remote upload not configured; skipping invoice copy");
            return Ok(None);
        };

        let fetched = self.fetcher.fetch(url).await?;
        let file = target
            .uploader
            .upload(fetched.file.path(), &fetched.file_name, &target.folder_id)
            .await?;

        Ok(Some(file))
    }
}

fn record_failure(failures: &mut Vec<StepFailure>, step: WorkflowStep, error: &dyn std::fmt::Display) {
    tracing::warn!(step = step.as_str(), error = %error, "Invoice step failed; continuing");
    counter!("invoice_step_failures_total", "step" => step.as_str()).increment(1);
    failures.push(StepFailure {
        step,
        message: error.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use crate::services::mock::{MockOp, MockRecordStore, MockUploader};
    use crate::services::record_store::TableRef;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tables() -> TablesConfig {
        TablesConfig {
            ledger: TableRef::new("appLedger", "tblPayments"),
            leaders: TableRef::new("appLeaders", "tblLeaders"),
            purchase_orders: TableRef::new("appLedger", "tblOrders"),
            leader_email_field: "Email".to_string(),
        }
    }

    fn payload(total: f64, pdf_url: Option<String>) -> InvoicePayload {
        InvoicePayload {
            payment_name: "October deliverables".to_string(),
            invoice_date: "2025-10-30".to_string(),
            description: "Two promo videos".to_string(),
            total_payment: total,
            purchase_order: "PO-1001".to_string(),
            email: "jane@example.com".to_string(),
            invoice_pdf_url: pdf_url,
        }
    }

    fn seeded_store() -> Arc<MockRecordStore> {
        let store = Arc::new(MockRecordStore::new());
        let t = tables();
        store.seed(
            &t.leaders,
            "recLeader",
            json!({"Email": ["jane@example.com"], "Status": "Contract signed"}),
        );
        store.seed(
            &t.purchase_orders,
            "recOrder",
            json!({"Orders": "PO-1001", "Balance": 1000}),
        );
        store
    }

    fn workflow(store: Arc<MockRecordStore>, upload: Option<UploadTarget>) -> InvoiceWorkflow {
        workflow_with_fetch(store, upload, FetchConfig::default())
    }

    fn workflow_with_fetch(
        store: Arc<MockRecordStore>,
        upload: Option<UploadTarget>,
        fetch: FetchConfig,
    ) -> InvoiceWorkflow {
        let fetcher = AttachmentFetcher::new(&fetch).unwrap();
        InvoiceWorkflow::new(store, tables(), upload, fetcher)
    }

    async fn pdf_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/invoices/inv-7.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 invoice".to_vec()))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn runs_every_step_in_order() {
        let server = pdf_server().await;
        let url = format!("{}/invoices/inv-7.pdf", server.uri());
        let store = seeded_store();
        let uploader = Arc::new(MockUploader::succeeding());
        let target = UploadTarget {
            uploader: uploader.clone(),
            folder_id: "folder-123".to_string(),
        };

        let outcome = workflow(store.clone(), Some(target))
            .process(&payload(250.0, Some(url.clone())))
            .await
            .unwrap();

        assert_eq!(outcome.leaders_updated, 1);
        assert_eq!(outcome.purchase_orders_updated, 1);
        assert!(outcome.failures.is_empty());

        let ledger = store.records(&tables().ledger);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].fields[fields::TOTAL_PAYMENT], json!(250.0));
        assert_eq!(ledger[0].fields[fields::PURCHASE_ORDERS], json!("PO-1001"));

        let leader = store.record(&tables().leaders, "recLeader").unwrap();
        assert_eq!(leader.fields[fields::STATUS], json!(PAYMENT_REQUESTED_STATUS));
        assert_eq!(leader.fields[fields::INVOICE], json!([{ "url": url }]));

        let order = store.record(&tables().purchase_orders, "recOrder").unwrap();
        assert_eq!(order.fields[fields::BALANCE], json!(750.0));

        let uploads = uploader.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].folder_id, "folder-123");
        assert_eq!(uploads[0].file_name, "inv-7.pdf");
        assert_eq!(uploads[0].size, b"%PDF-1.4 invoice".len() as u64);
        assert_eq!(outcome.upload.unwrap().name, "inv-7.pdf");
    }

    #[tokio::test]
    async fn unknown_email_skips_leader_update() {
        let store = seeded_store();
        let mut p = payload(100.0, None);
        p.email = "stranger@example.com".to_string();

        let outcome = workflow(store.clone(), None).process(&p).await.unwrap();

        assert_eq!(outcome.leaders_updated, 0);
        assert!(outcome.failures.is_empty());
        let leader = store.record(&tables().leaders, "recLeader").unwrap();
        assert_eq!(leader.fields[fields::STATUS], json!("Contract signed"));
    }

    #[tokio::test]
    async fn unknown_purchase_order_still_records_payment() {
        let store = seeded_store();
        let mut p = payload(100.0, None);
        p.purchase_order = "PO-9999".to_string();

        let outcome = workflow(store.clone(), None).process(&p).await.unwrap();

        assert_eq!(outcome.purchase_orders_updated, 0);
        assert_eq!(store.records(&tables().ledger).len(), 1);
        let order = store.record(&tables().purchase_orders, "recOrder").unwrap();
        assert_eq!(order.fields[fields::BALANCE], json!(1000));
    }

    #[tokio::test]
    async fn overpayment_clamps_balance_to_zero() {
        let store = seeded_store();
        let outcome = workflow(store.clone(), None)
            .process(&payload(5000.0, None))
            .await
            .unwrap();

        assert_eq!(outcome.purchase_orders_updated, 1);
        let order = store.record(&tables().purchase_orders, "recOrder").unwrap();
        assert_eq!(order.fields[fields::BALANCE], json!(0.0));
    }

    #[tokio::test]
    async fn non_numeric_balance_is_treated_as_zero() {
        let store = Arc::new(MockRecordStore::new());
        store.seed(
            &tables().purchase_orders,
            "recOrder",
            json!({"Orders": "PO-1001", "Balance": "pending"}),
        );

        workflow(store.clone(), None)
            .process(&payload(10.0, None))
            .await
            .unwrap();

        let order = store.record(&tables().purchase_orders, "recOrder").unwrap();
        assert_eq!(order.fields[fields::BALANCE], json!(0.0));
    }

    #[tokio::test]
    async fn ledger_failure_aborts_before_other_writes() {
        let store = seeded_store();
        store.fail_on(&tables().ledger, MockOp::Insert);

        let err = workflow(store.clone(), None)
            .process(&payload(250.0, None))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Ledger(_)));
        let leader = store.record(&tables().leaders, "recLeader").unwrap();
        assert_eq!(leader.fields[fields::STATUS], json!("Contract signed"));
        let order = store.record(&tables().purchase_orders, "recOrder").unwrap();
        assert_eq!(order.fields[fields::BALANCE], json!(1000));
    }

    #[tokio::test]
    async fn leader_failure_is_reported_and_later_steps_run() {
        let store = seeded_store();
        store.fail_on(&tables().leaders, MockOp::Update);

        let outcome = workflow(store.clone(), None)
            .process(&payload(250.0, None))
            .await
            .unwrap();

        assert_eq!(outcome.leaders_updated, 0);
        assert_eq!(outcome.purchase_orders_updated, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].step, WorkflowStep::LeaderUpdate);
    }

    #[tokio::test]
    async fn purchase_order_lookup_failure_is_reported() {
        let store = seeded_store();
        store.fail_on(&tables().purchase_orders, MockOp::Query);

        let outcome = workflow(store.clone(), None)
            .process(&payload(250.0, None))
            .await
            .unwrap();

        assert_eq!(outcome.leaders_updated, 1);
        assert_eq!(outcome.purchase_orders_updated, 0);
        assert_eq!(outcome.failures[0].step, WorkflowStep::PurchaseOrderUpdate);
    }

    #[tokio::test]
    async fn upload_failure_degrades_to_null() {
        let server = pdf_server().await;
        let store = seeded_store();
        let uploader = Arc::new(MockUploader::failing());
        let target = UploadTarget {
            uploader: uploader.clone(),
            folder_id: "folder-123".to_string(),
        };

        let outcome = workflow(store, Some(target))
            .process(&payload(
                250.0,
                Some(format!("{}/invoices/inv-7.pdf", server.uri())),
            ))
            .await
            .unwrap();

        assert!(outcome.upload.is_none());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].step, WorkflowStep::Upload);
        assert_eq!(outcome.leaders_updated, 1);
        assert_eq!(outcome.purchase_orders_updated, 1);
    }

    #[tokio::test]
    async fn slow_attachment_download_is_reported_as_upload_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/invoices/slow.pdf"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"%PDF-1.4 invoice".to_vec())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let store = seeded_store();
        let uploader = Arc::new(MockUploader::succeeding());
        let target = UploadTarget {
            uploader: uploader.clone(),
            folder_id: "folder-123".to_string(),
        };
        let fetch = FetchConfig {
            timeout: Duration::from_millis(200),
            ..FetchConfig::default()
        };

        let outcome = workflow_with_fetch(store, Some(target), fetch)
            .process(&payload(
                250.0,
                Some(format!("{}/invoices/slow.pdf", server.uri())),
            ))
            .await
            .unwrap();

        assert!(outcome.upload.is_none());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].step, WorkflowStep::Upload);
        assert!(uploader.uploads().is_empty());
        assert_eq!(outcome.purchase_orders_updated, 1);
    }

    #[tokio::test]
    async fn oversized_attachment_is_reported_as_upload_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/invoices/huge.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 4096]))
            .mount(&server)
            .await;

        let store = seeded_store();
        let uploader = Arc::new(MockUploader::succeeding());
        let target = UploadTarget {
            uploader: uploader.clone(),
            folder_id: "folder-123".to_string(),
        };
        let fetch = FetchConfig {
            max_bytes: 1024,
            ..FetchConfig::default()
        };

        let outcome = workflow_with_fetch(store, Some(target), fetch)
            .process(&payload(
                250.0,
                Some(format!("{}/invoices/huge.pdf", server.uri())),
            ))
            .await
            .unwrap();

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].step, WorkflowStep::Upload);
        assert!(outcome.failures[0].message.contains("1024"));
        assert!(uploader.uploads().is_empty());
    }

    #[tokio::test]
    async fn missing_pdf_url_skips_upload_silently() {
        let store = seeded_store();
        let uploader = Arc::new(MockUploader::succeeding());
        let target = UploadTarget {
            uploader: uploader.clone(),
            folder_id: "folder-123".to_string(),
        };

        let outcome = workflow(store.clone(), Some(target))
            .process(&payload(250.0, None))
            .await
            .unwrap();

        assert!(outcome.upload.is_none());
        assert!(outcome.failures.is_empty());
        assert!(uploader.uploads().is_empty());
        let leader = store.record(&tables().leaders, "recLeader").unwrap();
        assert!(!leader.fields.contains_key(fields::INVOICE));
    }

    #[tokio::test]
    async fn resubmission_creates_a_second_ledger_row() {
        // Submissions are not idempotent: each one is a new payment request.
        let store = seeded_store();
        let wf = workflow(store.clone(), None);
        let p = payload(300.0, None);

        wf.process(&p).await.unwrap();
        wf.process(&p).await.unwrap();

        let ledger = store.records(&tables().ledger);
        assert_eq!(ledger.len(), 2);
        assert_ne!(ledger[0].id, ledger[1].id);
        let order = store.record(&tables().purchase_orders, "recOrder").unwrap();
        assert_eq!(order.fields[fields::BALANCE], json!(400.0));
    }
}
