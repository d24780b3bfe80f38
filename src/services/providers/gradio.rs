//! Gradio Space client.
//!
//! Talks to the Gradio HTTP API of a Hugging Face Space using the two-step
//! call protocol: `POST /gradio_api/call/<endpoint>` returns an `event_id`,
//! then `GET /gradio_api/call/<endpoint>/<event_id>` streams server-sent
//! events until a `complete` (or `error`) event carries the result.

use super::{PredictionProvider, ProviderError};
use crate::config::GradioSettings;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Client handle for one Gradio Space endpoint.
pub struct GradioClient {
    client: Client,
    base_url: String,
    api_endpoint: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallResponse {
    event_id: String,
}

impl GradioClient {
    /// Construct the client and probe the Space once.
    ///
    /// The probe fetches the Space's `/config` so that an unreachable or
    /// unauthorized Space fails here, at startup, rather than on the first
    /// request.
    pub async fn connect(settings: &GradioSettings) -> Result<Self, ProviderError> {
        if settings.space.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gradio Space is not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ProviderError::NotConfigured(e.to_string()))?;

        let this = Self {
            client,
            base_url: space_base_url(&settings.space),
            api_endpoint: settings.api_endpoint.clone(),
            token: settings
                .hf_token
                .as_ref()
                .map(|t| t.expose_secret().clone()),
        };

        let url = format!("{}/config", this.base_url);
        let response = this
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(this)
        } else if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            Err(ProviderError::Unauthorized(format!(
                "Space rejected credentials: {}",
                status
            )))
        } else {
            Err(ProviderError::ApiError(format!(
                "Space config probe failed: {}",
                status
            )))
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Submit the question and return the event id to poll.
    async fn submit(&self, question: &str) -> Result<String, ProviderError> {
        let url = format!("{}/gradio_api/call{}", self.base_url, self.api_endpoint);
        let body = json!({ "data": [question] });

        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError(format!(
                "Gradio call failed {}: {}",
                status, error_text
            )));
        }

        let call: CallResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("missing event_id: {}", e)))?;

        Ok(call.event_id)
    }

    /// Fetch the event stream for a submitted call and extract the result.
    async fn fetch_result(&self, event_id: &str) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/gradio_api/call{}/{}",
            self.base_url, self.api_endpoint, event_id
        );

        let response = self
            .request(reqwest::Method::GET, &url)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "Gradio result fetch failed: {}",
                response.status()
            )));
        }

        // The stream closes after the terminal event, so the full body is
        // safe to buffer here.
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        parse_sse_result(&body)
    }
}

#[async_trait]
impl PredictionProvider for GradioClient {
    async fn predict(&self, question: &str) -> Result<Value, ProviderError> {
        tracing::debug!(
            endpoint = %self.api_endpoint,
            question_len = question.len(),
            "calling Gradio API"
        );

        let event_id = self.submit(question).await?;
        self.fetch_result(&event_id).await
    }
}

/// Resolve a Space id or URL to a base URL.
///
/// `owner/name` becomes `https://owner-name.hf.space`; anything that already
/// looks like a URL is used verbatim.
fn space_base_url(space: &str) -> String {
    if space.starts_with("http://") || space.starts_with("https://") {
        space.trim_end_matches('/').to_string()
    } else {
        let subdomain = space.to_lowercase().replace(['/', '_', '.'], "-");
        format!("https://{}.hf.space", subdomain)
    }
}

/// Extract the prediction result from a Gradio SSE body.
///
/// Gradio emits `event:`/`data:` line pairs; intermediate events such as
/// `heartbeat` and `generating` are skipped. The `complete` event's data is a
/// JSON array of output values; a single-output endpoint yields one element.
fn parse_sse_result(body: &str) -> Result<Value, ProviderError> {
    let mut current_event = "";

    for line in body.lines() {
        if let Some(event) = line.strip_prefix("event:") {
            current_event = event.trim();
        } else if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim();
            match current_event {
                "complete" => {
                    let outputs: Value = serde_json::from_str(data).map_err(|e| {
                        ProviderError::InvalidResponse(format!("malformed result payload: {}", e))
                    })?;
                    return match outputs {
                        Value::Array(mut items) if !items.is_empty() => Ok(items.remove(0)),
                        Value::Array(_) => Err(ProviderError::InvalidResponse(
                            "empty result payload".to_string(),
                        )),
                        other => Ok(other),
                    };
                }
                "error" => {
                    return Err(ProviderError::ApiError(format!(
                        "Gradio reported an error: {}",
                        data
                    )));
                }
                _ => {}
            }
        }
    }

    Err(ProviderError::InvalidResponse(
        "stream ended without a complete event".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_id_maps_to_hf_subdomain() {
        assert_eq!(
            space_base_url("Ankys/shl-recommender-api"),
            "https://ankys-shl-recommender-api.hf.space"
        );
    }

    #[test]
    fn explicit_url_is_used_verbatim() {
        assert_eq!(
            space_base_url("http://localhost:7860/"),
            "http://localhost:7860"
        );
    }

    #[test]
    fn parses_complete_event() {
        let body = "event: heartbeat\ndata: null\n\nevent: complete\ndata: [\"SHL is...\"]\n\n";
        let result = parse_sse_result(body).unwrap();
        assert_eq!(result, Value::String("SHL is...".to_string()));
    }

    #[test]
    fn error_event_is_an_api_error() {
        let body = "event: error\ndata: \"boom\"\n\n";
        let err = parse_sse_result(body).unwrap_err();
        assert!(matches!(err, ProviderError::ApiError(_)));
    }

    #[test]
    fn truncated_stream_is_invalid() {
        let err = parse_sse_result("event: generating\ndata: [\"partial\"]\n\n").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
