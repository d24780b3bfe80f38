//! Mock provider implementation for testing.

use super::{PredictionProvider, ProviderError};
use async_trait::async_trait;
use serde_json::Value;

/// Canned behavior for [`MockPredictionProvider`].
pub enum MockBehavior {
    /// Return this value for every question.
    Respond(Value),
    /// Echo the question back inside a fixed template.
    Echo,
    /// Fail every call with an API error.
    Fail(String),
}

/// Mock prediction provider for testing handlers without a Space.
pub struct MockPredictionProvider {
    behavior: MockBehavior,
}

impl MockPredictionProvider {
    pub fn new(behavior: MockBehavior) -> Self {
        Self { behavior }
    }

    pub fn respond_with(value: Value) -> Self {
        Self::new(MockBehavior::Respond(value))
    }

    pub fn failing(message: &str) -> Self {
        Self::new(MockBehavior::Fail(message.to_string()))
    }
}

#[async_trait]
impl PredictionProvider for MockPredictionProvider {
    async fn predict(&self, question: &str) -> Result<Value, ProviderError> {
        match &self.behavior {
            MockBehavior::Respond(value) => Ok(value.clone()),
            MockBehavior::Echo => Ok(Value::String(format!("Mock response for: {}", question))),
            MockBehavior::Fail(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }
}
