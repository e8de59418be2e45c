//! Anthropic Messages API adapter.
//!
//! One request per call, no streaming. Deep-tier requests with a reasoning
//! budget enable extended thinking; the budget counts against `max_tokens`,
//! so the request asks for `reasoning + visible` tokens. Only `text` blocks
//! make it into the answer.

use crate::config::FileEngineConfig;
use async_trait::async_trait;
use deliberation_application::{EngineError, ReasoningEngine};
use deliberation_domain::RemoteRequest;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Reasoning engine backed by the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct AnthropicEngine {
    client: reqwest::Client,
    base_url: String,
}

impl AnthropicEngine {
    pub fn new(
        api_key: &str,
        base_url: impl Into<String>,
        api_version: &str,
        timeout: Duration,
    ) -> Result<Self, EngineError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let key = HeaderValue::from_str(api_key)
            .map_err(|_| EngineError::Other("Invalid API key format".to_string()))?;
        headers.insert("x-api-key", key);
        let version = HeaderValue::from_str(api_version)
            .map_err(|_| EngineError::Other("Invalid API version".to_string()))?;
        headers.insert("anthropic-version", version);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| EngineError::Other(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build from the `[engine]` section, reading the key from the
    /// configured environment variable.
    pub fn from_config(config: &FileEngineConfig) -> Result<Self, EngineError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| EngineError::Other(format!("{} is not set", config.api_key_env)))?;
        Self::new(
            &api_key,
            config.base_url.as_str(),
            &config.api_version,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

// =============================================================================
// API TYPES
// =============================================================================

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: [ApiMessage<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking: Option<Thinking>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct Thinking {
    #[serde(rename = "type")]
    kind: &'static str,
    budget_tokens: u32,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl<'a> MessagesRequest<'a> {
    fn new(model: &'a str, request: &'a RemoteRequest) -> Self {
        Self {
            model,
            max_tokens: request.max_output_tokens(),
            system: request.persona.as_deref(),
            messages: [ApiMessage {
                role: "user",
                content: &request.prompt,
            }],
            thinking: request.reasoning_budget.map(|budget_tokens| Thinking {
                kind: "enabled",
                budget_tokens,
            }),
        }
    }
}

/// Join the `text` blocks; thinking blocks are dropped
fn answer_text(response: MessagesResponse) -> Option<String> {
    let parts: Vec<String> = response
        .content
        .into_iter()
        .filter(|b| b.kind == "text")
        .filter_map(|b| b.text)
        .collect();
    let text = parts.join("\n");
    if text.trim().is_empty() { None } else { Some(text) }
}

fn transport_error(e: reqwest::Error) -> EngineError {
    if e.is_timeout() {
        EngineError::Timeout
    } else if e.is_connect() || e.is_request() {
        EngineError::Connection(e.to_string())
    } else {
        EngineError::Other(e.to_string())
    }
}

#[async_trait]
impl ReasoningEngine for AnthropicEngine {
    async fn complete(&self, model: &str, request: &RemoteRequest) -> Result<String, EngineError> {
        let body = MessagesRequest::new(model, request);
        debug!(
            "POST {} model={} max_tokens={} thinking={}",
            self.messages_url(),
            model,
            body.max_tokens,
            body.thinking.is_some()
        );

        let response = self
            .client
            .post(self.messages_url())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await.map_err(transport_error)?;
        answer_text(parsed).ok_or(EngineError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine(server: &MockServer, timeout: Duration) -> AnthropicEngine {
        AnthropicEngine::new("sk-test", server.uri(), "2023-06-01", timeout).unwrap()
    }

    #[tokio::test]
    async fn test_joins_text_blocks_and_skips_thinking() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "sk-test"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    {"type": "thinking", "thinking": "hmm"},
                    {"type": "text", "text": "first"},
                    {"type": "text", "text": "second"}
                ]
            })))
            .mount(&server)
            .await;

        let text = engine(&server, Duration::from_secs(5))
            .complete("cheap-model", &RemoteRequest::cheap("hi", 256))
            .await
            .unwrap();
        assert_eq!(text, "first\nsecond");
    }

    #[tokio::test]
    async fn test_thinking_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(body_partial_json(json!({
                "model": "deep-model",
                "max_tokens": 14096,
                "system": "You are a CFO.",
                "thinking": {"type": "enabled", "budget_tokens": 10000},
                "messages": [{"role": "user", "content": "why?"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "because"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = RemoteRequest::deep("why?", 4096)
            .with_persona(Some("You are a CFO."))
            .with_reasoning_budget(10_000);
        let text = engine(&server, Duration::from_secs(5))
            .complete("deep-model", &request)
            .await
            .unwrap();
        assert_eq!(text, "because");
    }

    #[tokio::test]
    async fn test_plain_request_has_no_thinking_or_system() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "ok"}]
            })))
            .mount(&server)
            .await;

        engine(&server, Duration::from_secs(5))
            .complete("m", &RemoteRequest::cheap("q", 100))
            .await
            .unwrap();

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert_eq!(body["max_tokens"], 100);
        assert!(body.get("thinking").is_none());
        assert!(body.get("system").is_none());
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = engine(&server, Duration::from_secs(5))
            .complete("m", &RemoteRequest::cheap("q", 10))
            .await
            .unwrap_err();
        match err {
            EngineError::Status { code, body } => {
                assert_eq!(code, 529);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_text_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "thinking", "thinking": "only thoughts"}]
            })))
            .mount(&server)
            .await;

        let err = engine(&server, Duration::from_secs(5))
            .complete("m", &RemoteRequest::cheap("q", 10))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"content": [{"type": "text", "text": "late"}]}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = engine(&server, Duration::from_millis(50))
            .complete("m", &RemoteRequest::cheap("q", 10))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Timeout));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = FileEngineConfig {
            api_key_env: "DELIBERATION_TEST_KEY_THAT_IS_NOT_SET".to_string(),
            ..Default::default()
        };
        let err = AnthropicEngine::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("DELIBERATION_TEST_KEY_THAT_IS_NOT_SET"));
    }
}
