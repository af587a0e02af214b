//! Google Gemini generateContent adapter

use super::http::{build_client, send_json};
use super::{ProviderBuildError, SYSTEM_PROMPT, TEMPERATURE};
use crate::config::FileGeminiConfig;
use aeo_application::ProviderAdapter;
use aeo_domain::{FailureKind, ProviderAnswer, ProviderFailure, ProviderId, ProviderResult};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

pub struct GeminiAdapter {
    id: ProviderId,
    client: ReqwestClient,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl GeminiAdapter {
    pub fn new(config: &FileGeminiConfig, api_key: String) -> Result<Self, ProviderBuildError> {
        Ok(Self {
            id: ProviderId::new("gemini"),
            client: build_client()?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn answer_from(&self, response: GenerateResponse, latency: Duration) -> ProviderResult {
        let model = response.model_version.unwrap_or_else(|| self.model.clone());

        let blocked = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .is_some();
        let candidate = response.candidates.into_iter().next();
        let safety_stop = candidate
            .as_ref()
            .and_then(|c| c.finish_reason.as_deref())
            .is_some_and(|reason| reason == "SAFETY");

        let has_candidate = candidate.is_some();
        let text = candidate
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if blocked || safety_stop {
            return Ok(ProviderAnswer::new(self.id.clone(), text, latency)
                .with_model(model)
                .refused());
        }

        if !has_candidate {
            return Err(ProviderFailure::new(
                self.id.clone(),
                FailureKind::Malformed,
                "response contained no candidates",
            ));
        }

        Ok(ProviderAnswer::new(self.id.clone(), text, latency).with_model(model))
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    fn model(&self) -> Option<&str> {
        Some(&self.model)
    }

    async fn ask(&self, question: &str, timeout: Duration) -> ProviderResult {
        let request = GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: [Part {
                    text: SYSTEM_PROMPT,
                }],
            },
            contents: [Content {
                role: Some("user"),
                parts: [Part { text: question }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_tokens,
                temperature: TEMPERATURE,
            },
        };

        let started = Instant::now();
        let builder = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&request);
        let response: GenerateResponse = send_json(&self.id, builder, timeout).await?;
        let latency = started.elapsed();
        debug!("gemini answered in {}ms", latency.as_millis());

        self.answer_from(response, latency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeo_domain::FailureKind;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer) -> GeminiAdapter {
        let config = FileGeminiConfig {
            base_url: server.uri(),
            ..Default::default()
        };
        GeminiAdapter::new(&config, "g-test".to_string()).unwrap()
    }

    async fn mount(server: &MockServer, status: u16, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "g-test"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_answer() {
        let server = MockServer::start().await;
        mount(
            &server,
            200,
            serde_json::json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Acme "}, {"text": "leads."}]},
                    "finishReason": "STOP"
                }],
                "modelVersion": "gemini-1.5-flash-002"
            }),
        )
        .await;

        let answer = adapter(&server)
            .ask("Best CRM?", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(answer.text, "Acme leads.");
        assert_eq!(answer.model.as_deref(), Some("gemini-1.5-flash-002"));
        assert!(!answer.refused);
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_refusal() {
        let server = MockServer::start().await;
        mount(
            &server,
            200,
            serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}}),
        )
        .await;

        let answer = adapter(&server)
            .ask("Best CRM?", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(answer.refused);
        assert_eq!(answer.model.as_deref(), Some("gemini-1.5-flash"));
    }

    #[tokio::test]
    async fn test_safety_finish_is_refusal() {
        let server = MockServer::start().await;
        mount(
            &server,
            200,
            serde_json::json!({"candidates": [{"finishReason": "SAFETY"}]}),
        )
        .await;

        let answer = adapter(&server)
            .ask("Best CRM?", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(answer.refused);
    }

    #[tokio::test]
    async fn test_empty_parts_is_an_empty_answer() {
        let server = MockServer::start().await;
        mount(
            &server,
            200,
            serde_json::json!({
                "candidates": [{"content": {"role": "model", "parts": []}, "finishReason": "STOP"}]
            }),
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
    async fn test_no_candidates_is_malformed() {
        let server = MockServer::start().await;
        mount(&server, 200, serde_json::json!({"candidates": []})).await;

        let failure = adapter(&server)
            .ask("Best CRM?", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Malformed);
    }

    #[tokio::test]
    async fn test_forbidden() {
        let server = MockServer::start().await;
        mount(
            &server,
            403,
            serde_json::json!({"error": {"status": "PERMISSION_DENIED"}}),
        )
        .await;

        let failure = adapter(&server)
            .ask("Best CRM?", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::AuthError);
    }
}
