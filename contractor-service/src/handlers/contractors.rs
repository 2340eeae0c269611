use crate::dtos::ContractorListResponse;
use crate::services::contractors::summarize;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;

pub async fn list_contractors(
    State(state): State<AppState>,
) -> Result<Json<ContractorListResponse>, AppError> {
    let records = state
        .store
        .query(&state.config.tables.leaders, None)
        .await
        .map_err(|e| {
            tracing::error!(table = %state.config.tables.leaders, error = %e, "Failed to list contractors");
            e
        })?;

    let contractors = summarize(&records);
    tracing::debug!(
        fetched = records.len(),
        returned = contractors.len(),
        "Contractors listed"
    );

    Ok(Json(ContractorListResponse {
        status: "success",
        contractors,
    }))
}
