//! Prediction provider abstractions and implementations.
//!
//! The proxy treats the upstream prediction service as an opaque black box
//! behind the [`PredictionProvider`] trait, so handlers can be exercised
//! against a mock without network access.

pub mod gradio;
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Short stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::Unauthorized(_) => "unauthorized",
            ProviderError::NetworkError(_) => "network_error",
            ProviderError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Trait for the remote prediction call.
///
/// Implementations must be safe to share across concurrent requests; the
/// proxy constructs one provider at startup and never rebuilds it.
#[async_trait]
pub trait PredictionProvider: Send + Sync {
    /// Forward a question to the remote service and return its opaque result.
    async fn predict(&self, question: &str) -> Result<Value, ProviderError>;
}
