use crate::models::DocumentFormat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a generated contract is returned to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    /// Stream the file in the response body.
    #[default]
    Inline,
    /// Return its location on the server as JSON.
    Path,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContractRequest {
    #[serde(default)]
    pub record: Option<Map<String, Value>>,
    #[serde(default)]
    pub format: Option<DocumentFormat>,
    #[serde(default)]
    pub delivery: Option<Delivery>,
}

#[derive(Debug, Serialize)]
pub struct GenerateContractResponse {
    pub status: &'static str,
    pub file_path: String,
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub filename: String,
}
