//! Core trait definitions for model clients.
//!
//! The async trait here is implemented by the `cybermetric-providers` crate
//! for each supported backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Chat messages
// ---------------------------------------------------------------------------

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// A single chat-style message sent to a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Model client trait
// ---------------------------------------------------------------------------

/// A backend that can answer chat requests.
///
/// The engine only ever sees the raw response body as JSON; each backend
/// knows how to pull the reply text back out of its own response shape.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Human-readable backend name (e.g. "ollama").
    fn name(&self) -> &str;

    /// Send a chat request and return the backend's raw response.
    ///
    /// Any error is treated by the engine as transient and retried.
    async fn send(&self, model: &str, messages: &[ChatMessage]) -> anyhow::Result<serde_json::Value>;

    /// Extract the reply text from a raw response.
    ///
    /// Must not fail: a response lacking the expected structure, or carrying
    /// empty content, yields `None`.
    fn extract_text(&self, response: &serde_json::Value) -> Option<String>;

    /// List models this backend can serve.
    async fn list_models(&self) -> anyhow::Result<Vec<ModelInfo>>;
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Backend name.
    pub provider: String,
    /// Maximum context window size in tokens (0 if unknown).
    pub max_context: u32,
}

/// Returns `true` if a raw response carries nothing at all.
///
/// `null`, `false`, and empty strings, arrays or objects count as no output.
pub fn is_empty_output(response: &serde_json::Value) -> bool {
    use serde_json::Value;

    match response {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_serializes_lowercase() {
        let msg = ChatMessage::system("hi");
        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v, json!({"role": "system", "content": "hi"}));
        assert_eq!(
            serde_json::to_value(ChatMessage::user("q")).unwrap()["role"],
            "user"
        );
    }

    #[test]
    fn empty_output_detection() {
        assert!(is_empty_output(&json!(null)));
        assert!(is_empty_output(&json!({})));
        assert!(is_empty_output(&json!([])));
        assert!(is_empty_output(&json!("")));
        assert!(is_empty_output(&json!(false)));

        assert!(!is_empty_output(&json!({"message": {"content": ""}})));
        assert!(!is_empty_output(&json!("B")));
        assert!(!is_empty_output(&json!(0)));
    }
}
