use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query parameters accepted by `GET /ask`.
#[derive(Debug, Deserialize)]
pub struct AskQuery {
    pub user_question: Option<String>,
}

/// Success envelope returned by `/ask`.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub status: &'static str,
    pub result: Value,
}

impl AskResponse {
    pub fn success(result: Value) -> Self {
        Self {
            status: "success",
            result,
        }
    }
}
