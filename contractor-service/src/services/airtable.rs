//! Airtable REST client.
//!
//! Implements list (with `filterByFormula` and offset pagination), create and
//! patch against `{api_url}/{base}/{table}`. Every call is one network round
//! trip; there is no caching and no retry.

use crate::config::AirtableConfig;
use crate::services::formula::Formula;
use crate::services::record_store::{Fields, Record, RecordStore, StoreError, TableRef};
use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Airtable client for interacting with the Airtable API.
#[derive(Clone)]
pub struct AirtableClient {
    client: Client,
    config: AirtableConfig,
}

/// One page of a list response.
#[derive(Debug, Deserialize)]
struct ListPage {
    #[serde(default)]
    records: Vec<Value>,
    offset: Option<String>,
}

#[derive(Debug, Serialize)]
struct WriteRequest<'a> {
    fields: &'a Fields,
}

/// Airtable API error response.
#[derive(Debug, Deserialize)]
struct AirtableErrorBody {
    error: AirtableErrorDetail,
}

/// Airtable reports errors either as a bare string or as `{type, message}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AirtableErrorDetail {
    Code(String),
    Detailed {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        message: Option<String>,
    },
}

impl AirtableErrorDetail {
    fn describe(&self) -> String {
        match self {
            AirtableErrorDetail::Code(code) => code.clone(),
            AirtableErrorDetail::Detailed { kind, message } => match message {
                Some(message) => format!("{}: {}", kind, message),
                None => kind.clone(),
            },
        }
    }
}

impl AirtableClient {
    pub fn new(config: AirtableConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn table_url(&self, table: &TableRef) -> String {
        format!(
            "{}/{}/{}",
            self.config.api_url.trim_end_matches('/'),
            table.base,
            table.table
        )
    }

    async fn read_record(response: Response) -> Result<Record, StoreError> {
        let body = Self::read_body(response).await?;
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Body of a successful response, or the store's error as `StoreError::Api`.
    async fn read_body(response: Response) -> Result<String, StoreError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<AirtableErrorBody>(&body)
            .map(|e| e.error.describe())
            .unwrap_or_else(|_| body.clone());

        tracing::warn!(status = %status, message = %message, "Airtable request failed");

        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RecordStore for AirtableClient {
    async fn query(
        &self,
        table: &TableRef,
        filter: Option<&Formula>,
    ) -> Result<Vec<Record>, StoreError> {
        let url = self.table_url(table);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut params: Vec<(&str, String)> = Vec::new();
            if let Some(formula) = filter {
                params.push(("filterByFormula", formula.expression()));
            }
            if let Some(offset) = &offset {
                params.push(("offset", offset.clone()));
            }

            let response = self
                .client
                .get(&url)
                .bearer_auth(self.config.api_key.expose_secret())
                .query(&params)
                .send()
                .await?;

            let body = Self::read_body(response).await?;
            let page: ListPage =
                serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;

            for raw in page.records {
                match serde_json::from_value::<Record>(raw) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::warn!(table = %table, error = %e, "Skipping malformed record")
                    }
                }
            }

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        tracing::debug!(
            table = %table,
            filter = ?filter.map(Formula::expression),
            count = records.len(),
            "Airtable query completed"
        );

        Ok(records)
    }

    async fn insert(&self, table: &TableRef, fields: Fields) -> Result<Record, StoreError> {
        let response = self
            .client
            .post(self.table_url(table))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&WriteRequest { fields: &fields })
            .send()
            .await?;

        let record = Self::read_record(response).await?;
        tracing::info!(table = %table, record_id = %record.id, "Airtable record created");
        Ok(record)
    }

    async fn update(
        &self,
        table: &TableRef,
        id: &str,
        fields: Fields,
    ) -> Result<Record, StoreError> {
        let response = self
            .client
            .patch(format!("{}/{}", self.table_url(table), id))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&WriteRequest { fields: &fields })
            .send()
            .await?;

        let record = Self::read_record(response).await?;
        tracing::info!(table = %table, record_id = %record.id, "Airtable record updated");
        Ok(record)
    }
}
