use crate::dtos::InvoiceResponse;
use crate::models::InvoicePayload;
use crate::startup::AppState;
use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use service_core::error::AppError;
use validator::Validate;

pub async fn process_invoice(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<InvoicePayload>, AppError>,
) -> Result<Json<InvoiceResponse>, AppError> {
    payload.validate()?;

    tracing::info!(
        payment_name = %payload.payment_name,
        purchase_order = %payload.purchase_order,
        has_pdf = payload.pdf_url().is_some(),
        "Processing invoice"
    );

    let outcome = state.workflow.process(&payload).await?;
    Ok(Json(InvoiceResponse::from(outcome)))
}
