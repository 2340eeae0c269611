use crate::config::FetchConfig;
use crate::services::uploader::UploadError;
use reqwest::{Client, Url};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

/// A remote document copied to a temporary local file.
///
/// The file is removed when this value is dropped.
pub struct FetchedFile {
    pub file: NamedTempFile,
    pub file_name: String,
}

/// Downloads invoice attachments so they can be re-uploaded.
///
/// Requests are bounded by the configured timeouts and bodies larger than
/// `max_bytes` are abandoned.
#[derive(Clone)]
pub struct AttachmentFetcher {
    client: Client,
    max_bytes: u64,
}

impl AttachmentFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            max_bytes: config.max_bytes,
        })
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchedFile, UploadError> {
        let parsed = Url::parse(url).map_err(|e| UploadError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(UploadError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        let file_name = file_name_from_url(&parsed);

        let mut response = self.client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Api {
                status: status.as_u16(),
                message: format!("failed to fetch {}", url),
            });
        }
        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(UploadError::TooLarge {
                    limit: self.max_bytes,
                });
            }
        }

        let file = tempfile::Builder::new()
            .prefix("invoice_")
            .suffix(".pdf")
            .tempfile()?;
        let mut out = tokio::fs::File::create(file.path()).await?;
        let mut size: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            size += chunk.len() as u64;
            if size > self.max_bytes {
                return Err(UploadError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            out.write_all(&chunk).await?;
        }
        out.flush().await?;

        tracing::debug!(
            url = %url,
            size,
            path = ?file.path(),
            "Fetched invoice attachment"
        );

        Ok(FetchedFile { file, file_name })
    }
}

/// Last path segment of the URL, or `invoice.pdf` when there is none.
fn file_name_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .unwrap_or_else(|| "invoice.pdf".to_string())
}
