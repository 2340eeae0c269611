use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness message kept for existing form clients.
pub async fn root() -> impl IntoResponse {
    Json(json!({ "status": "ok", "message": "Backend running" }))
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "contractor-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
