//! Visibility check entity

use crate::provider::{ProviderAnswer, ProviderId};
use crate::visibility::classifier::{Classification, ListPosition};
use crate::visibility::status::VisibilityStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Experiment period a check was collected for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodTag {
    Control,
    Test,
}

impl PeriodTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodTag::Control => "control",
            PeriodTag::Test => "test",
        }
    }
}

impl std::fmt::Display for PeriodTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One classified answer (Entity)
///
/// Immutable once created. `score` always equals `status.score()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityCheck {
    pub brand: String,
    pub question: String,
    pub provider: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: VisibilityStatus,
    pub score: u8,
    #[serde(default)]
    pub cited_sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_position: Option<ListPosition>,
    #[serde(default)]
    pub competitors_found: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mention_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<PeriodTag>,
    #[serde(default)]
    pub latency_ms: u64,
}

impl VisibilityCheck {
    pub fn new(
        brand: impl Into<String>,
        question: impl Into<String>,
        answer: &ProviderAnswer,
        classification: Classification,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            brand: brand.into(),
            question: question.into(),
            provider: answer.provider.clone(),
            model: answer.model.clone(),
            timestamp,
            status: classification.status,
            score: classification.status.score(),
            cited_sources: classification.cited_sources,
            list_position: classification.list_position,
            competitors_found: classification.competitors_found,
            mention_context: classification.mention_context,
            raw_answer: Some(answer.text.clone()),
            period: None,
            latency_ms: answer.latency.as_millis() as u64,
        }
    }

    pub fn with_period(mut self, period: Option<PeriodTag>) -> Self {
        self.period = period;
        self
    }

    /// Drop the raw answer text before storing
    pub fn without_raw_answer(mut self) -> Self {
        self.raw_answer = None;
        self
    }

    pub fn is_visible(&self) -> bool {
        self.status.is_visible()
    }

    pub fn is_featured(&self) -> bool {
        self.status == VisibilityStatus::Featured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::brand::Brand;
    use crate::visibility::classifier::classify;
    use chrono::TimeZone;
    use std::time::Duration;

    fn sample() -> VisibilityCheck {
        let answer = ProviderAnswer::new(
            ProviderId::new("openai"),
            "The best CRM is Acme.",
            Duration::from_millis(420),
        )
        .with_model("gpt-4o-mini");
        let classification = classify(&answer.text, &Brand::new("Acme"));
        VisibilityCheck::new(
            "Acme",
            "What is the best CRM?",
            &answer,
            classification,
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_check_carries_classification() {
        let check = sample();
        assert_eq!(check.status, VisibilityStatus::Featured);
        assert_eq!(check.score, 100);
        assert_eq!(check.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(check.latency_ms, 420);
        assert!(check.is_visible());
        assert!(check.is_featured());
    }

    #[test]
    fn test_serde_shape() {
        let check = sample().with_period(Some(PeriodTag::Control)).without_raw_answer();
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["status"], "featured");
        assert_eq!(json["period"], "control");
        assert!(json.get("raw_answer").is_none());

        let back: VisibilityCheck = serde_json::from_value(json).unwrap();
        assert_eq!(back, check);
    }
}
