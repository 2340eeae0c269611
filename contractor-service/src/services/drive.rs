//! Google Drive uploader authenticated with a service account.
//!
//! Each upload signs an RS256 assertion with the account's private key,
//! exchanges it for an access token and posts the file as a
//! `multipart/related` request (metadata part + content part).

use crate::config::DriveConfig;
use crate::services::uploader::{UploadError, UploadedFile, Uploader};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;

const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Clone)]
pub struct GoogleDriveUploader {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    upload_url: String,
}

impl GoogleDriveUploader {
    pub fn new(config: &DriveConfig) -> Result<Self, UploadError> {
        let key: ServiceAccountKey = serde_json::from_str(config.credentials.expose_secret())
            .map_err(|e| UploadError::Credentials(e.to_string()))?;
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| UploadError::Credentials(e.to_string()))?;

        Ok(Self {
            client: Client::new(),
            key,
            encoding_key,
            upload_url: config.upload_url.trim_end_matches('/').to_string(),
        })
    }

    async fn access_token(&self) -> Result<String, UploadError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: DRIVE_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| UploadError::Credentials(e.to_string()))?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl Uploader for GoogleDriveUploader {
    async fn upload(
        &self,
        local_path: &Path,
        file_name: &str,
        folder_id: &str,
    ) -> Result<UploadedFile, UploadError> {
        let data = tokio::fs::read(local_path).await?;
        let token = self.access_token().await?;

        let metadata = json!({
            "name": file_name,
            "parents": [folder_id],
        });
        let boundary = format!("upload-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_related_body(&boundary, &metadata, "application/pdf", &data);

        let response = self
            .client
            .post(format!("{}/drive/v3/files", self.upload_url))
            .query(&[
                ("uploadType", "multipart"),
                ("supportsAllDrives", "true"),
                ("fields", "id,name,webViewLink"),
            ])
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = %status, body = %text, "Drive upload rejected");
            return Err(UploadError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let file: UploadedFile =
            serde_json::from_str(&text).map_err(|e| UploadError::Rejected(e.to_string()))?;

        tracing::info!(
            file_id = %file.id,
            file_name = %file.name,
            folder_id = %folder_id,
            size = data.len(),
            "Uploaded file to Drive"
        );

        Ok(file)
    }
}

fn multipart_related_body(
    boundary: &str,
    metadata: &Value,
    content_type: &str,
    data: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 512);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{m}\r\n--{b}\r\nContent-Type: {ct}\r\n\r\n",
            b = boundary,
            m = metadata,
            ct = content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}
