//! Provider value objects.
//!
//! A provider is an external LLM-backed answer service. The domain only knows
//! its identifier and the two shapes a single call can produce:
//! [`ProviderAnswer`] or [`ProviderFailure`].

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Stable identifier of a provider backend (e.g. `openai`, `anthropic`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_lowercase())
    }

    pub fn try_new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidProvider(
                "provider id cannot be empty".to_string(),
            ));
        }
        Ok(Self::new(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        ProviderId::new(s)
    }
}

/// A successful answer from one provider call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAnswer {
    pub provider: ProviderId,
    /// Concrete model that produced the answer, when the backend reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub text: String,
    pub latency: Duration,
    /// The backend flagged the answer as a refusal
    #[serde(default)]
    pub refused: bool,
}

impl ProviderAnswer {
    pub fn new(provider: ProviderId, text: impl Into<String>, latency: Duration) -> Self {
        Self {
            provider,
            model: None,
            text: text.into(),
            latency,
            refused: false,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn refused(mut self) -> Self {
        self.refused = true;
        self
    }
}

/// Why a provider call produced no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    RateLimited,
    AuthError,
    Timeout,
    Unavailable,
    Malformed,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::RateLimited => "rate_limited",
            FailureKind::AuthError => "auth_error",
            FailureKind::Timeout => "timeout",
            FailureKind::Unavailable => "unavailable",
            FailureKind::Malformed => "malformed",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed failure of one provider call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub kind: FailureKind,
    pub detail: String,
}

impl ProviderFailure {
    pub fn new(provider: ProviderId, kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            detail: detail.into(),
        }
    }

    pub fn timeout(provider: ProviderId, after: Duration) -> Self {
        Self::new(
            provider,
            FailureKind::Timeout,
            format!("no answer within {}ms", after.as_millis()),
        )
    }
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.provider, self.kind, self.detail)
    }
}

/// Outcome of one provider call
pub type ProviderResult = Result<ProviderAnswer, ProviderFailure>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id_normalized() {
        assert_eq!(ProviderId::new(" OpenAI ").as_str(), "openai");
        assert!(ProviderId::try_new("  ").is_err());
    }

    #[test]
    fn test_failure_display() {
        let failure = ProviderFailure::timeout(ProviderId::new("gemini"), Duration::from_secs(2));
        assert_eq!(failure.to_string(), "gemini [timeout]: no answer within 2000ms");
    }

    #[test]
    fn test_failure_kind_serde() {
        let json = serde_json::to_string(&FailureKind::RateLimited).unwrap();
        assert_eq!(json, "\"rate_limited\"");
    }
}
