use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Fixed message returned for every upstream failure. The real error is
/// logged server-side and never leaked to the caller.
pub const UPSTREAM_FAILURE_MESSAGE: &str =
    "Failed to get prediction from the upstream prediction API. Please check logs or try again later.";

/// Fixed message returned while the prediction client is unavailable.
pub const CLIENT_UNAVAILABLE_MESSAGE: &str =
    "Backend prediction client not initialized or unavailable.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream prediction call failed")]
    Upstream,

    #[error("Prediction client unavailable")]
    ClientUnavailable,

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorEnvelope {
            status: &'static str,
            message: String,
        }

        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream => (StatusCode::BAD_GATEWAY, UPSTREAM_FAILURE_MESSAGE.to_string()),
            AppError::ClientUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                CLIENT_UNAVAILABLE_MESSAGE.to_string(),
            ),
            AppError::ConfigError(_) | AppError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (
            status,
            Json(ErrorEnvelope {
                status: "error",
                message,
            }),
        )
            .into_response()
    }
}
