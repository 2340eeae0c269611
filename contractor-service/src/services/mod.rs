pub mod airtable;
pub mod balance;
pub mod contractors;
pub mod drive;
pub mod fetcher;
pub mod formula;
pub mod invoice_workflow;
pub mod lookup;
pub mod metrics;
pub mod mock;
pub mod record_store;
pub mod renderer;
pub mod uploader;

pub use airtable::AirtableClient;
pub use drive::GoogleDriveUploader;
pub use fetcher::AttachmentFetcher;
pub use invoice_workflow::{InvoiceOutcome, InvoiceWorkflow, UploadTarget};
pub use self::metrics::{get_metrics, init_metrics};
pub use record_store::{Record, RecordStore, StoreError, TableRef};
pub use renderer::{ContractRenderer, GeneratedDocument, RenderError};
pub use uploader::{UploadedFile, Uploader};
