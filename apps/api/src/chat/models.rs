//! Request/response shapes for the chat endpoints.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Accepted for API compatibility with the frontend; never read.
    #[serde(default)]
    #[allow(dead_code)]
    pub chat_history: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Success,
    Error,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub status: QueryStatus,
    pub error: Option<String>,
}

impl QueryResponse {
    pub fn success(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            status: QueryStatus::Success,
            error: None,
        }
    }

    pub fn error(answer: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            status: QueryStatus::Error,
            error: Some(error.into()),
        }
    }
}
