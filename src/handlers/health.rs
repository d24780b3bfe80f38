use crate::startup::AppState;
use axum::extract::State;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Liveness/readiness signal: reports whether the prediction client was
/// constructed at startup. Not a deep connectivity check.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.provider.is_some() {
        (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "gradio_client_status": "initialized"
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "gradio_client_status": "not_initialized"
            })),
        )
    }
}
