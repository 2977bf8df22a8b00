use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One conversational turn. Role is usually "user" or "assistant".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Oldest first.
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Response envelope for the completions endpoint.
///
/// Fields are private so the only way to build one is through
/// [`ChatResponse::from_value`] or [`ChatResponse::from_cause`].
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    value: Option<Value>,
    success: bool,
    cause: Option<String>,
}

impl ChatResponse {
    pub fn from_value(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            success: true,
            cause: None,
        }
    }

    pub fn from_cause(cause: impl Into<String>) -> Self {
        Self {
            value: None,
            success: false,
            cause: Some(cause.into()),
        }
    }
}
