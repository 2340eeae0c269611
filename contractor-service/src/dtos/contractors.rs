use crate::services::contractors::ContractorSummary;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ContractorListResponse {
    pub status: &'static str,
    pub contractors: Vec<ContractorSummary>,
}
