//! Application startup and lifecycle management.

use crate::config::Settings;
use crate::handlers::{
    ask::{ask_get, ask_post},
    health::health_check,
    metrics::metrics,
};
use crate::middleware::{metrics_middleware, request_id_middleware};
use crate::services::providers::PredictionProvider;
use crate::services::GradioClient;
use axum::{
    middleware::from_fn,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
///
/// `provider` is `None` when client construction failed at startup; the
/// service then runs degraded and answers 503 until restarted. The handle is
/// read-only after startup, so concurrent requests share it without locking.
#[derive(Clone)]
pub struct AppState {
    pub provider: Option<Arc<dyn PredictionProvider>>,
    pub settings: Settings,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ask", get(ask_get).post(ask_post))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(CorsLayer::permissive())
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    ///
    /// The prediction client is constructed exactly once here. Failure is
    /// not fatal: the service comes up in degraded mode and keeps serving,
    /// answering 503 on `/ask` and `/health`.
    pub async fn build(settings: Settings) -> Result<Self, std::io::Error> {
        tracing::info!(space = %settings.gradio.space, "initializing Gradio client");

        let provider: Option<Arc<dyn PredictionProvider>> =
            match GradioClient::connect(&settings.gradio).await {
                Ok(client) => {
                    tracing::info!(base_url = %client.base_url(), "Gradio client initialized");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(
                        space = %settings.gradio.space,
                        error = %e,
                        "failed to initialize Gradio client; serving in degraded mode"
                    );
                    None
                }
            };

        Self::with_provider(settings, provider).await
    }

    /// Build the application around an already-constructed provider.
    ///
    /// Used by tests to inject a mock; `build` goes through here too.
    pub async fn with_provider(
        settings: Settings,
        provider: Option<Arc<dyn PredictionProvider>>,
    ) -> Result<Self, std::io::Error> {
        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            e
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            state: AppState { provider, settings },
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let app = build_router(self.state);
        let addr: SocketAddr = self.listener.local_addr()?;
        tracing::info!("ask-proxy listening on {}", addr);
        axum::serve(self.listener, app).await
    }
}
