//! OpenAI chat completions adapter

use super::http::{build_client, send_json};
use super::{ProviderBuildError, SYSTEM_PROMPT, TEMPERATURE};
use crate::config::FileOpenAiConfig;
use aeo_application::ProviderAdapter;
use aeo_domain::{FailureKind, ProviderAnswer, ProviderFailure, ProviderId, ProviderResult};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

pub struct OpenAiAdapter {
    id: ProviderId,
    client: ReqwestClient,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiAdapter {
    pub fn new(config: &FileOpenAiConfig, api_key: String) -> Result<Self, ProviderBuildError> {
        Ok(Self {
            id: ProviderId::new("openai"),
            client: build_client()?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    fn answer_from(&self, response: ChatResponse, latency: Duration) -> ProviderResult {
        let model = response.model.unwrap_or_else(|| self.model.clone());
        let Some(choice) = response.choices.into_iter().next() else {
            return Err(ProviderFailure::new(
                self.id.clone(),
                FailureKind::Malformed,
                "response contained no choices",
            ));
        };

        let filtered = choice.finish_reason.as_deref() == Some("content_filter");
        if let Some(refusal) = choice.message.refusal.filter(|r| !r.trim().is_empty()) {
            return Ok(ProviderAnswer::new(self.id.clone(), refusal, latency)
                .with_model(model)
                .refused());
        }
        if filtered {
            let text = choice.message.content.unwrap_or_default();
            return Ok(ProviderAnswer::new(self.id.clone(), text, latency)
                .with_model(model)
                .refused());
        }

        // An empty answer is still an answer; it classifies as not found
        let text = choice.message.content.unwrap_or_default();
        Ok(ProviderAnswer::new(self.id.clone(), text, latency).with_model(model))
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn id(&self) -> &ProviderId {
        &self.id
    }

    fn model(&self) -> Option<&str> {
        Some(&self.model)
    }

    async fn ask(&self, question: &str, timeout: Duration) -> ProviderResult {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
        };

        let started = Instant::now();
        let builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request);
        let response: ChatResponse = send_json(&self.id, builder, timeout).await?;
        let latency = started.elapsed();
        debug!("openai answered in {}ms", latency.as_millis());

        self.answer_from(response, latency)
    }
}
