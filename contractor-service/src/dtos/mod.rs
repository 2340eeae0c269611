pub mod contractors;
pub mod contracts;
pub mod invoices;
pub mod records;

pub use contractors::ContractorListResponse;
pub use contracts::{Delivery, DownloadParams, GenerateContractRequest, GenerateContractResponse};
pub use invoices::InvoiceResponse;
pub use records::{RecordRequest, RecordResponse};
