use crate::dtos::{Delivery, DownloadParams, GenerateContractRequest, GenerateContractResponse};
use crate::models::{ContractFields, DocumentFormat};
use crate::startup::AppState;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use service_core::error::AppError;
use std::path::Path;
use tokio_util::io::ReaderStream;

pub async fn generate_contract(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<GenerateContractRequest>, AppError>,
) -> Result<Response, AppError> {
    let record = request
        .record
        .filter(|record| !record.is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No record data provided")))?;

    let fields = ContractFields::from_record(&record).map_err(|missing| {
        tracing::warn!(missing = ?missing, "Contract request is missing fields");
        AppError::MissingFields(missing)
    })?;
    let format = request.format.unwrap_or_default();

    let renderer = state.renderer.clone();
    let document = tokio::task::spawn_blocking(move || renderer.render(&fields, format))
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Render task failed: {}", e)))??;

    match request.delivery.unwrap_or_default() {
        Delivery::Inline => file_response(&document.path, &document.file_name, "inline").await,
        Delivery::Path => Ok(Json(GenerateContractResponse {
            status: "success",
            file_path: document.path.to_string_lossy().into_owned(),
            filename: document.file_name,
        })
        .into_response()),
    }
}

pub async fn download_contract(
    State(state): State<AppState>,
    WithRejection(Query(params), _): WithRejection<Query<DownloadParams>, AppError>,
) -> Result<Response, AppError> {
    let file_name = validated_file_name(&params.filename)?;
    let path = state.renderer.output_dir().join(file_name);

    file_response(&path, file_name, "attachment").await
}

/// Accepts a bare file name only; anything that could leave the output
/// directory is rejected.
fn validated_file_name(raw: &str) -> Result<&str, AppError> {
    let name = raw.trim();
    let is_bare = !name.is_empty()
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().and_then(|n| n.to_str()) == Some(name);

    if is_bare {
        Ok(name)
    } else {
        tracing::warn!(filename = %raw, "Rejected contract file name");
        Err(AppError::BadRequest(anyhow::anyhow!(
            "Invalid filename: {}",
            raw
        )))
    }
}

async fn file_response(
    path: &Path,
    file_name: &str,
    disposition: &str,
) -> Result<Response, AppError> {
    let file = tokio::fs::File::open(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            AppError::NotFound(anyhow::anyhow!("File not found: {}", file_name))
        }
        _ => AppError::from(e),
    })?;

    let content_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(DocumentFormat::from_extension)
        .map(|format| format.content_type())
        .unwrap_or("application/octet-stream");

    tracing::info!(file = %file_name, disposition, "Serving contract");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("{}; filename=\"{}\"", disposition, file_name),
            ),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}
