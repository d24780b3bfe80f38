use crate::error::AppError;
use config::{Config as Cfg, File};
use secrecy::Secret;
use serde::Deserialize;
use std::env;

/// Default upstream call timeout. Gradio Spaces can cold-start, so this is generous.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub gradio: GradioSettings,
}

/// HTTP listener settings, overridable via `APP_HOST` / `APP_PORT`.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Upstream Gradio Space settings.
#[derive(Debug, Clone)]
pub struct GradioSettings {
    /// Space id (`owner/name`) or a full base URL.
    pub space: String,
    /// Named Gradio endpoint to invoke, e.g. `/predict`.
    pub api_endpoint: String,
    /// Optional Hugging Face token for private Spaces.
    pub hf_token: Option<Secret<String>>,
    /// Timeout applied to every upstream HTTP call.
    pub timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let server = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        let gradio = GradioSettings {
            space: env_or("HF_GRADIO_API_SPACE", "Ankys/shl-recommender-api"),
            api_endpoint: env_or("API_ENDPOINT", "/predict"),
            hf_token: env::var("HF_TOKEN").ok().map(Secret::new),
            timeout_secs: env_or("GRADIO_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Settings { server, gradio })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_to_default() {
        assert_eq!(env_or("ASK_PROXY_UNSET_VAR", "fallback"), "fallback");
    }
}
