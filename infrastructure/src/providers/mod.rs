//! Provider adapters
//!
//! One adapter per LLM backend, each implementing the application's
//! [`ProviderAdapter`](aeo_application::ProviderAdapter) port over `reqwest`.
//! Wire formats stay inside this module.

pub mod anthropic;
pub mod gemini;
pub mod http;
pub mod openai;
pub mod registry;

pub use anthropic::AnthropicAdapter;
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;
pub use registry::{build_providers, KNOWN_PROVIDERS};

use thiserror::Error;

/// System prompt sent with every question
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer the user's question thoroughly, \
providing specific product/service recommendations when relevant. \
Include sources or references where applicable.";

/// Sampling temperature for every backend
pub const TEMPERATURE: f32 = 0.7;

/// Errors raised while wiring provider adapters from config
#[derive(Error, Debug)]
pub enum ProviderBuildError {
    #[error("Unknown provider '{0}' (known: openai, anthropic, gemini)")]
    Unknown(String),

    #[error("Provider '{0}' is disabled in config")]
    Disabled(String),

    #[error("Provider '{provider}' has no API key (set {env_var})")]
    MissingApiKey { provider: String, env_var: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
