pub mod contractors;
pub mod contracts;
pub mod health;
pub mod invoices;
pub mod metrics;
pub mod records;

pub use contractors::list_contractors;
pub use contracts::{download_contract, generate_contract};
pub use health::{health_check, root};
pub use invoices::process_invoice;
pub use self::metrics::metrics_endpoint;
pub use records::create_record;
