//! Remote file storage seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Descriptor of a file stored remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub name: String,
    #[serde(alias = "webViewLink", default)]
    pub web_view_link: Option<String>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid service account credentials: {0}")]
    Credentials(String),

    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote storage returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("local file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source file exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("invalid source url: {0}")]
    InvalidUrl(String),

    #[error("upload rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait Uploader: Send + Sync {
    /// Uploads the file at `local_path` into `folder_id` under `file_name`.
    async fn upload(
        &self,
        local_path: &Path,
        file_name: &str,
        folder_id: &str,
    ) -> Result<UploadedFile, UploadError>;
}
