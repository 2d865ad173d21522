//! Mock client for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use cybermetric_core::traits::{ChatMessage, ModelClient, ModelInfo, Role};

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Reply with this text.
    Text(String),
    /// Return an empty response body.
    Empty,
    /// Fail the request with this message.
    Error(String),
}

impl MockReply {
    pub fn text(s: &str) -> Self {
        MockReply::Text(s.to_string())
    }
}

/// A mock model client for exercising the engine without real API calls.
///
/// Replies come from, in order of precedence: the script (consumed front to
/// back, last entry repeats), then the first prompt-substring match, then the
/// default reply.
pub struct MockClient {
    /// Map of prompt substring → reply.
    responses: HashMap<String, MockReply>,
    /// Replies consumed in order.
    script: Mutex<VecDeque<MockReply>>,
    /// Reply if nothing else applies.
    default_reply: MockReply,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last messages received.
    last_messages: Mutex<Option<Vec<ChatMessage>>>,
}

impl MockClient {
    /// Create a mock with prompt-substring → reply text mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses: responses
                .into_iter()
                .map(|(k, v)| (k, MockReply::Text(v)))
                .collect(),
            script: Mutex::new(VecDeque::new()),
            default_reply: MockReply::Empty,
            call_count: AtomicU32::new(0),
            last_messages: Mutex::new(None),
        }
    }

    /// Create a mock that always replies with the same text.
    pub fn with_fixed_response(response: &str) -> Self {
        Self::with_default(MockReply::text(response))
    }

    /// Create a mock whose every request fails.
    pub fn always_failing(message: &str) -> Self {
        Self::with_default(MockReply::Error(message.to_string()))
    }

    /// Create a mock that plays `replies` in order, repeating the last one.
    pub fn scripted(replies: Vec<MockReply>) -> Self {
        let mock = Self::new(HashMap::new());
        *mock.script.lock().unwrap_or_else(|e| e.into_inner()) = replies.into();
        mock
    }

    fn with_default(reply: MockReply) -> Self {
        Self {
            default_reply: reply,
            ..Self::new(HashMap::new())
        }
    }

    /// Get the number of calls made to this client.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last messages sent to this client.
    pub fn last_messages(&self) -> Option<Vec<ChatMessage>> {
        self.last_messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn next_reply(&self, messages: &[ChatMessage]) -> MockReply {
        {
            let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
            if script.len() > 1 {
                if let Some(reply) = script.pop_front() {
                    return reply;
                }
            }
            if let Some(reply) = script.front() {
                return reply.clone();
            }
        }

        let prompt = messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        self.responses
            .iter()
            .find(|(key, _)| prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

#[async_trait]
impl ModelClient for MockClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, model: &str, messages: &[ChatMessage]) -> anyhow::Result<Value> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_messages.lock().unwrap_or_else(|e| e.into_inner()) = Some(messages.to_vec());

        match self.next_reply(messages) {
            MockReply::Text(text) => Ok(json!({ "model": model, "content": text })),
            MockReply::Empty => Ok(Value::Null),
            MockReply::Error(message) => Err(anyhow::anyhow!(message)),
        }
    }

    fn extract_text(&self, response: &Value) -> Option<String> {
        response
            .get("content")?
            .as_str()
            .filter(|content| !content.is_empty())
            .map(str::to_string)
    }

    async fn list_models(&self) -> anyhow::Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(question: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("system"),
            ChatMessage::user(format!("Question: {question}")),
        ]
    }

    #[tokio::test]
    async fn fixed_response() {
        let client = MockClient::with_fixed_response("B");
        let raw = client.send("mock", &messages("anything")).await.unwrap();
        assert_eq!(client.extract_text(&raw).as_deref(), Some("B"));
        assert_eq!(client.call_count(), 1);
        assert_eq!(client.last_messages().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn prompt_matching() {
        let mut responses = HashMap::new();
        responses.insert("SSH".to_string(), "B".to_string());
        responses.insert("HTTPS".to_string(), "A".to_string());
        let client = MockClient::new(responses);

        let raw = client.send("mock", &messages("Default SSH port?")).await.unwrap();
        assert_eq!(client.extract_text(&raw).as_deref(), Some("B"));

        let raw = client.send("mock", &messages("What is HTTPS?")).await.unwrap();
        assert_eq!(client.extract_text(&raw).as_deref(), Some("A"));

        // Unmatched prompts get an empty body
        let raw = client.send("mock", &messages("Unrelated")).await.unwrap();
        assert!(raw.is_null());
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn script_plays_in_order_and_repeats_last() {
        let client = MockClient::scripted(vec![
            MockReply::Error("boom".into()),
            MockReply::Empty,
            MockReply::text("C"),
        ]);

        assert!(client.send("m", &messages("q")).await.is_err());
        assert!(client.send("m", &messages("q")).await.unwrap().is_null());
        for _ in 0..3 {
            let raw = client.send("m", &messages("q")).await.unwrap();
            assert_eq!(client.extract_text(&raw).as_deref(), Some("C"));
        }
    }

    #[tokio::test]
    async fn always_failing() {
        let client = MockClient::always_failing("backend down");
        let err = client.send("m", &messages("q")).await.unwrap_err();
        assert!(err.to_string().contains("backend down"));
    }
}
