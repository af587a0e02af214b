//! Brand value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// A brand whose visibility is tracked (Value Object)
///
/// The brand is classification input only; nothing in the core mutates it.
/// `domain` and every entry of `keywords` are treated as identifiers
/// equivalent to the name when scanning answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
}

impl Brand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: None,
            keywords: Vec::new(),
            competitors: Vec::new(),
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    pub fn with_competitor(mut self, competitor: impl Into<String>) -> Self {
        self.competitors.push(competitor.into());
        self
    }

    /// Reject brands that can never be matched
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidBrand(
                "brand name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// All identifiers for this brand, lowercased, deduplicated, longest first.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = std::iter::once(self.name.as_str())
            .chain(self.domain.as_deref())
            .chain(self.keywords.iter().map(String::as_str))
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        ids.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        ids.dedup();
        ids
    }
}

impl std::fmt::Display for Brand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.domain {
            Some(domain) => write!(f, "{} ({})", self.name, domain),
            None => write!(f, "{}", self.name),
        }
    }
}
