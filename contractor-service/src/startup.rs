//! Application startup and lifecycle management.

use crate::config::{ContractorConfig, DriveSettings};
use crate::handlers;
use crate::services::{
    AirtableClient, AttachmentFetcher, ContractRenderer, GoogleDriveUploader, InvoiceWorkflow,
    RecordStore, UploadTarget,
};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    cors_layer, metrics_middleware, request_id_middleware, REQUEST_ID_HEADER,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ContractorConfig,
    pub store: Arc<dyn RecordStore>,
    pub renderer: Arc<ContractRenderer>,
    pub workflow: Arc<InvoiceWorkflow>,
}

impl AppState {
    /// Wires the services around an existing store and optional uploader.
    pub fn new(
        config: ContractorConfig,
        store: Arc<dyn RecordStore>,
        upload: Option<UploadTarget>,
    ) -> Result<Self, AppError> {
        let renderer = ContractRenderer::new(&config.documents)?;
        let fetcher = AttachmentFetcher::new(&config.fetch)
            .map_err(|e| AppError::InternalError(anyhow::Error::new(e)))?;
        let workflow = InvoiceWorkflow::new(store.clone(), config.tables.clone(), upload, fetcher);

        Ok(Self {
            config,
            store,
            renderer: Arc::new(renderer),
            workflow: Arc::new(workflow),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let origins = state.config.common.allowed_origins();
    let output_dir = state.renderer.output_dir().to_path_buf();

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/generate-contract", post(handlers::generate_contract))
        .route("/download-contract", get(handlers::download_contract))
        .route("/invoice", post(handlers::process_invoice))
        .route("/contractors", get(handlers::list_contractors))
        .route("/update", post(handlers::create_record))
        .nest_service("/generated_contracts", ServeDir::new(output_dir))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(cors_layer(&origins))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Builds the production service graph: Airtable store and, when
    /// configured, Google Drive uploads.
    pub async fn build(config: ContractorConfig) -> Result<Self, AppError> {
        let store: Arc<dyn RecordStore> = Arc::new(AirtableClient::new(config.airtable.clone()));

        let upload = match &config.drive {
            DriveSettings::Enabled(drive) => match GoogleDriveUploader::new(drive) {
                Ok(uploader) => {
                    tracing::info!(folder_id = %drive.folder_id, "Drive upload enabled");
                    Some(UploadTarget {
                        uploader: Arc::new(uploader),
                        folder_id: drive.folder_id.clone(),
                    })
                }
                Err(e) => {
                    tracing::error!(error = %e, "Drive credentials rejected; upload disabled");
                    None
                }
            },
            DriveSettings::Incomplete => {
                tracing::warn!(
                    "Drive upload needs both GOOGLE_DRIVE_FOLDER_ID and GOOGLE_SERVICE_ACCOUNT_JSON; upload disabled"
                );
                None
            }
            DriveSettings::Disabled => {
                tracing::warn!("Drive upload not configured - invoice PDFs will not be copied");
                None
            }
        };

        let state = AppState::new(config, store, upload)?;
        Self::with_state(state).await
    }

    /// Binds the listener for an already wired state (port 0 picks a free port).
    pub async fn with_state(state: AppState) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], state.config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            output_dir = %state.renderer.output_dir().display(),
            "Contractor service listening"
        );

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
