//! `/ask` handlers.
//!
//! GET and POST differ only in how the question is extracted; both delegate
//! to [`process_question`]. Client availability is checked before any input
//! parsing: in degraded mode every `/ask` request answers 503, regardless of
//! what the caller sent.

use crate::error::AppError;
use crate::models::{AskQuery, AskResponse};
use crate::services::metrics;
use crate::services::providers::PredictionProvider;
use crate::startup::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// `POST /ask` with JSON body `{"user_question": "..."}`.
pub async fn ask_post(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let provider = require_provider(&state)?;

    let Json(body) = payload.map_err(|e| {
        tracing::warn!(error = %e, "received non-JSON POST request");
        AppError::BadRequest("Request body must be JSON for POST requests.".to_string())
    })?;

    // Presence is the only validation: any non-null value is forwarded,
    // non-strings via their JSON rendering.
    let question = match body.get("user_question") {
        None | Some(Value::Null) => {
            tracing::warn!("received POST request without 'user_question' key");
            return Err(AppError::BadRequest(
                "Missing 'user_question' key in JSON body for POST requests.".to_string(),
            ));
        }
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    process_question(&state, provider.as_ref(), &question).await
}

/// `GET /ask?user_question=...`.
pub async fn ask_get(
    State(state): State<AppState>,
    Query(params): Query<AskQuery>,
) -> Result<Json<AskResponse>, AppError> {
    let provider = require_provider(&state)?;

    let question = params.user_question.ok_or_else(|| {
        tracing::warn!("received GET request without 'user_question' query parameter");
        AppError::BadRequest("Missing 'user_question' query parameter for GET requests.".to_string())
    })?;

    process_question(&state, provider.as_ref(), &question).await
}

fn require_provider(state: &AppState) -> Result<Arc<dyn PredictionProvider>, AppError> {
    state.provider.clone().ok_or_else(|| {
        tracing::error!("request received but the prediction client is not available");
        AppError::ClientUnavailable
    })
}

/// Forward the question to the prediction provider and wrap the outcome.
///
/// The empty string is a valid question and is forwarded as-is. Upstream
/// failures are logged in full but surface only as a fixed 502 message.
async fn process_question(
    state: &AppState,
    provider: &dyn PredictionProvider,
    question: &str,
) -> Result<Json<AskResponse>, AppError> {
    tracing::info!(question_len = question.len(), "processing question");

    let started = Instant::now();
    match provider.predict(question).await {
        Ok(result) => {
            let elapsed = started.elapsed();
            metrics::record_upstream_latency(
                &state.settings.gradio.api_endpoint,
                elapsed.as_secs_f64(),
            );
            tracing::info!(
                duration_ms = elapsed.as_millis() as u64,
                "prediction call succeeded"
            );
            Ok(Json(AskResponse::success(result)))
        }
        Err(e) => {
            metrics::record_upstream_error(e.kind());
            tracing::error!(
                error = %e,
                duration_ms = started.elapsed().as_millis() as u64,
                "prediction call failed"
            );
            Err(AppError::Upstream)
        }
    }
}
