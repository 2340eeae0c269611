#![allow(dead_code)]

use contractor_service::config::{
    AirtableConfig, ContractorConfig, DocumentsConfig, DriveSettings, FetchConfig, TablesConfig,
};
use contractor_service::services::mock::{MockRecordStore, MockUploader};
use contractor_service::services::{AirtableClient, RecordStore, TableRef, UploadTarget};
use contractor_service::{AppState, Application};
use secrecy::Secret;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const DRIVE_FOLDER_ID: &str = "folder-test";

pub fn ledger() -> TableRef {
    TableRef::new("appLedger", "tblLedger")
}

pub fn leaders() -> TableRef {
    TableRef::new("appLeaders", "tblLeaders")
}

pub fn purchase_orders() -> TableRef {
    TableRef::new("appLedger", "Purchase Orders")
}

pub fn test_config(output_dir: &std::path::Path, airtable_url: &str) -> ContractorConfig {
    ContractorConfig {
        common: service_core::config::Config {
            port: 0,
            ..Default::default()
        },
        airtable: AirtableConfig {
            api_key: Secret::new("test-airtable-key".to_string()),
            api_url: airtable_url.to_string(),
        },
        tables: TablesConfig {
            ledger: ledger(),
            leaders: leaders(),
            purchase_orders: purchase_orders(),
            leader_email_field: "Email".to_string(),
        },
        documents: DocumentsConfig {
            output_dir: output_dir.to_string_lossy().into_owned(),
            template_path: None,
        },
        drive: DriveSettings::Disabled,
        fetch: FetchConfig {
            timeout: Duration::from_secs(2),
            ..FetchConfig::default()
        },
        otlp_endpoint: None,
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    pub store: Arc<MockRecordStore>,
    pub uploader: Arc<MockUploader>,
    pub output_dir: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    /// App backed by the in-memory store and a succeeding uploader.
    pub async fn spawn() -> Self {
        Self::spawn_with_uploader(MockUploader::succeeding()).await
    }

    pub async fn spawn_with_uploader(uploader: MockUploader) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let output_dir = dir.path().join("generated_contracts");
        let config = test_config(&output_dir, "http://127.0.0.1:9");

        let store = Arc::new(MockRecordStore::new());
        let uploader = Arc::new(uploader);
        let upload = UploadTarget {
            uploader: uploader.clone(),
            folder_id: DRIVE_FOLDER_ID.to_string(),
        };

        let state = AppState::new(config, store.clone(), Some(upload))
            .expect("Failed to build application state");

        let (address, port) = start(state).await;
        TestApp {
            address,
            port,
            client: reqwest::Client::new(),
            store,
            uploader,
            output_dir,
            _dir: dir,
        }
    }

    /// App talking to a real Airtable client pointed at `airtable_url`.
    pub async fn spawn_with_airtable(airtable_url: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let output_dir = dir.path().join("generated_contracts");
        let config = test_config(&output_dir, airtable_url);

        let store: Arc<dyn RecordStore> = Arc::new(AirtableClient::new(config.airtable.clone()));
        let state =
            AppState::new(config, store, None).expect("Failed to build application state");

        let (address, port) = start(state).await;
        TestApp {
            address,
            port,
            client: reqwest::Client::new(),
            store: Arc::new(MockRecordStore::new()),
            uploader: Arc::new(MockUploader::succeeding()),
            output_dir,
            _dir: dir,
        }
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Names of the files currently in the output directory.
    pub fn generated_files(&self) -> Vec<String> {
        match std::fs::read_dir(&self.output_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Serves `state` on a random port and waits until it answers.
async fn start(state: AppState) -> (String, u16) {
    let app = Application::with_state(state)
        .await
        .expect("Failed to build test application");
    let port = app.port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    let client = reqwest::Client::new();
    for _ in 0..50 {
        if client.get(format!("{}/health", address)).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    (address, port)
}
