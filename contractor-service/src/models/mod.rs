pub mod contract;
pub mod invoice;

pub use contract::{ContractFields, ContractVariant, DocumentFormat, REQUIRED_FIELDS};
pub use invoice::InvoicePayload;
