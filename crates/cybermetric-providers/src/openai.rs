//! OpenAI API client implementation.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use cybermetric_core::traits::{ChatMessage, ModelClient, ModelInfo};

use crate::error::ProviderError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// OpenAI-compatible chat completions client.
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    org_id: Option<String>,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: &str, base_url: Option<String>, org_id: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            org_id,
            client,
        })
    }
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[async_trait]
impl ModelClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip(self, messages), fields(model = %model))]
    async fn send(&self, model: &str, messages: &[ChatMessage]) -> anyhow::Result<Value> {
        let body = OpenAiRequest { model, messages };

        let mut req = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json");

        if let Some(org) = &self.org_id {
            req = req.header("OpenAI-Organization", org);
        }

        let response = req
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e, &self.base_url, DEFAULT_TIMEOUT_SECS, ""))?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(body).into());
        }
        if status == 404 {
            return Err(ProviderError::ModelNotFound(model.to_string()).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError { status, body }.into());
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        Ok(raw)
    }

    fn extract_text(&self, response: &Value) -> Option<String> {
        response
            .get("choices")?
            .get(0)?
            .get("message")?
            .get("content")?
            .as_str()
            .filter(|content| !content.is_empty())
            .map(str::to_string)
    }

    async fn list_models(&self) -> anyhow::Result<Vec<ModelInfo>> {
        Ok(vec![
            ModelInfo {
                id: "gpt-4.1".into(),
                name: "GPT-4.1".into(),
                provider: "openai".into(),
                max_context: 1_000_000,
            },
            ModelInfo {
                id: "gpt-4.1-mini".into(),
                name: "GPT-4.1 Mini".into(),
                provider: "openai".into(),
                max_context: 1_000_000,
            },
            ModelInfo {
                id: "gpt-4o".into(),
                name: "GPT-4o".into(),
                provider: "openai".into(),
                max_context: 128_000,
            },
            ModelInfo {
                id: "gpt-3.5-turbo-0125".into(),
                name: "GPT-3.5 Turbo".into(),
                provider: "openai".into(),
                max_context: 16_385,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are a security expert who answers questions."),
            ChatMessage::user("Question: 2+2?"),
        ]
    }

    #[tokio::test]
    async fn successful_completion() {
        let server = MockServer::start().await;

        let response_body = json!({
            "choices": [{"message": {"content": "B", "role": "assistant"}, "index": 0}],
            "model": "gpt-3.5-turbo-0125",
            "usage": {"prompt_tokens": 40, "completion_tokens": 1, "total_tokens": 41}
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(json!({"model": "gpt-3.5-turbo-0125"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("test-key", Some(server.uri()), None).unwrap();
        let raw = client.send("gpt-3.5-turbo-0125", &messages()).await.unwrap();
        assert_eq!(client.extract_text(&raw).as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn organization_header_is_sent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("OpenAI-Organization", "org-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "C"}}]
            })))
            .mount(&server)
            .await;

        let client =
            OpenAiClient::new("key", Some(server.uri()), Some("org-123".into())).unwrap();
        let raw = client.send("gpt-4o", &messages()).await.unwrap();
        assert_eq!(client.extract_text(&raw).as_deref(), Some("C"));
    }

    #[tokio::test]
    async fn rate_limit_carries_retry_after() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("key", Some(server.uri()), None).unwrap();
        let err = client.send("gpt-4o", &messages()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::RateLimited { retry_after_ms: 7000 })
        ));
    }

    #[tokio::test]
    async fn error_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("key", Some(server.uri()), None).unwrap();
        let err = client.send("gpt-4o", &messages()).await.unwrap_err();
        assert!(err.to_string().contains("500"));
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::ApiError { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("bad", Some(server.uri()), None).unwrap();
        let err = client.send("gpt-4o", &messages()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::AuthenticationFailed(_))
        ));
    }

    #[test]
    fn extract_text_tolerates_missing_structure() {
        let client = OpenAiClient::new("key", None, None).unwrap();
        assert_eq!(client.extract_text(&json!({})), None);
        assert_eq!(client.extract_text(&json!({"choices": []})), None);
        assert_eq!(
            client.extract_text(&json!({"choices": [{"message": {"content": null}}]})),
            None
        );
        assert_eq!(
            client.extract_text(&json!({"choices": [{"message": {"content": ""}}]})),
            None
        );
        assert_eq!(
            client
                .extract_text(&json!({"choices": [{"message": {"content": "D"}}]}))
                .as_deref(),
            Some("D")
        );
    }

    #[tokio::test]
    async fn static_model_catalogue() {
        let client = OpenAiClient::new("key", None, None).unwrap();
        let models = client.list_models().await.unwrap();
        assert!(models.iter().any(|m| m.id == "gpt-3.5-turbo-0125"));
        assert!(models.iter().all(|m| m.provider == "openai"));
    }
}
