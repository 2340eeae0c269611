use crate::dtos::{RecordRequest, RecordResponse};
use crate::startup::AppState;
use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use service_core::error::AppError;

/// Inserts the posted record into the ledger table unchanged.
pub async fn create_record(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<RecordRequest>, AppError>,
) -> Result<Json<RecordResponse>, AppError> {
    let fields = request
        .record
        .filter(|record| !record.is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No record data provided")))?;

    let record = state
        .store
        .insert(&state.config.tables.ledger, fields)
        .await
        .map_err(|e| {
            tracing::error!(table = %state.config.tables.ledger, error = %e, "Ledger insert failed");
            e
        })?;

    tracing::info!(record_id = %record.id, "Ledger record created");
    Ok(Json(RecordResponse {
        status: "success",
        record,
    }))
}
