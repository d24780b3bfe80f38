//! End-to-end tests against a mock Gradio Space.
//!
//! These spawn the full application on a random port with an in-process HTTP
//! server standing in for the Space, exercising the real Gradio client.

use ask_proxy::config::{GradioSettings, ServerSettings, Settings};
use ask_proxy::startup::Application;
use axum::{routing::get, routing::post, Json, Router};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;

/// Spawn a minimal stand-in for a Gradio Space and return its base URL.
async fn spawn_mock_space() -> String {
    let app = Router::new()
        .route("/config", get(|| async { Json(json!({"version": "4.44.0"})) }))
        .route(
            "/gradio_api/call/predict",
            post(|| async { Json(json!({"event_id": "abc123"})) }),
        )
        .route(
            "/gradio_api/call/predict/:event_id",
            get(|| async { "event: complete\ndata: [\"SHL is...\"]\n\n" }),
        );

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock space listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn settings_for(space: &str) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        gradio: GradioSettings {
            space: space.to_string(),
            api_endpoint: "/predict".to_string(),
            hf_token: None,
            timeout_secs: 5,
        },
    }
}

/// Spawn the application on a random port and return the port number.
async fn spawn_app(space: &str) -> u16 {
    let app = Application::build(settings_for(space))
        .await
        .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    port
}

#[tokio::test]
async fn ask_roundtrip_through_gradio_client() {
    let space_url = spawn_mock_space().await;
    let port = spawn_app(&space_url).await;
    let client = Client::new();

    let response = client
        .post(format!("http://localhost:{}/ask", port))
        .json(&json!({"user_question": "What is SHL?"}))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "success");
    assert_eq!(body["result"], "SHL is...");
}

#[tokio::test]
async fn health_reports_initialized_after_successful_connect() {
    let space_url = spawn_mock_space().await;
    let port = spawn_app(&space_url).await;
    let client = Client::new();

    let response = client
        .get(format!("http://localhost:{}/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["gradio_client_status"], "initialized");
}

#[tokio::test]
async fn unreachable_space_serves_degraded() {
    // Nothing listens here, so client construction fails and the service
    // must keep serving in degraded mode.
    let port = spawn_app("http://127.0.0.1:9").await;
    let client = Client::new();

    let response = client
        .get(format!("http://localhost:{}/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 503);

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["gradio_client_status"], "not_initialized");

    let response = client
        .get(format!(
            "http://localhost:{}/ask?user_question=anything",
            port
        ))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 503);
}
