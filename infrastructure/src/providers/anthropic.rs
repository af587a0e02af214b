//! Anthropic messages adapter

use super::http::{build_client, send_json};
use super::{ProviderBuildError, SYSTEM_PROMPT, TEMPERATURE};
use crate::config::FileAnthropicConfig;
use aeo_application::ProviderAdapter;
use aeo_domain::{ProviderAnswer, ProviderId, ProviderResult};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicAdapter {
    id: ProviderId,
    client: ReqwestClient,
    api_key: String,
    base_url: String,
    api_version: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicAdapter {
    pub fn new(config: &FileAnthropicConfig, api_key: String) -> Result<Self, ProviderBuildError> {
        Ok(Self {
            id: ProviderId::new("anthropic"),
            client: build_client()?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn answer_from(&self, response: MessageResponse, latency: Duration) -> ProviderResult {
        let model = response.model.unwrap_or_else(|| self.model.clone());
        let text = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if response.stop_reason.as_deref() == Some("refusal") {
            return Ok(ProviderAnswer::new(self.id.clone(), text, latency)
                .with_model(model)
                .refused());
        }

        Ok(ProviderAnswer::new(self.id.clone(), text, latency).with_model(model))
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    fn model(&self) -> Option<&str> {
        Some(&self.model)
    }

    async fn ask(&self, question: &str, timeout: Duration) -> ProviderResult {
        let request = MessageRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: SYSTEM_PROMPT,
            messages: [Message {
                role: "user",
                content: question,
            }],
            temperature: TEMPERATURE,
        };

        let started = Instant::now();
        let builder = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&request);
        let response: MessageResponse = send_json(&self.id, builder, timeout).await?;
        let latency = started.elapsed();
        debug!("anthropic answered in {}ms", latency.as_millis());

        self.answer_from(response, latency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeo_domain::FailureKind;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> AnthropicAdapter {
        let config = FileAnthropicConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        AnthropicAdapter::new(&config, "test-api-key".to_string()).unwrap()
    }

    async fn mount(server: &MockServer, status: u16, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-api-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_joins_text_blocks() {
        let server = MockServer::start().await;
        mount(
            &server,
            200,
            serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "content": [
                    {"type": "text", "text": "Top picks:"},
                    {"type": "text", "text": "1. Acme"}
                ],
                "stop_reason": "end_turn"
            }),
        )
        .await;

        let answer = adapter(&server)
            .ask("Best CRM?", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(answer.text, "Top picks:\n1. Acme");
        assert_eq!(answer.model.as_deref(), Some("claude-sonnet-4-20250514"));
        assert!(!answer.refused);
    }

    #[tokio::test]
    async fn test_refusal_stop_reason() {
        let server = MockServer::start().await;
        mount(
            &server,
            200,
            serde_json::json!({"content": [], "stop_reason": "refusal"}),
        )
        .await;

        let answer = adapter(&server)
            .ask("Best CRM?", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(answer.refused);
    }

    #[tokio::test]
    async fn test_overloaded_is_unavailable() {
        let server = MockServer::start().await;
        mount(
            &server,
            529,
            serde_json::json!({"type": "error", "error": {"type": "overloaded_error"}}),
        )
        .await;

        let failure = adapter(&server)
            .ask("Best CRM?", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Unavailable);
    }

    #[tokio::test]
    async fn test_empty_content_is_an_empty_answer() {
        let server = MockServer::start().await;
        mount(
            &server,
            200,
            serde_json::json!({"content": [], "stop_reason": "end_turn"}),
        )
        .await;

        let answer = adapter(&server)
            .ask("Best CRM?", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(answer.text.is_empty());
        assert!(!answer.refused);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_malformed() {
        let server = MockServer::start().await;
        mount(&server, 200, serde_json::json!({"content": "not a block list"})).await;

        let failure = adapter(&server)
            .ask("Best CRM?", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Malformed);
    }
}
