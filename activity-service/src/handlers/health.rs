use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. Running with auditing off is still healthy.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "activity-service",
        "version": env!("CARGO_PKG_VERSION"),
        "auditing": state.consumer.is_active()
    }))
}

pub async fn readiness_check() -> StatusCode {
    StatusCode::OK
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
