//! Question value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A natural-language question posed to the providers (Value Object)
///
/// Identity is the question text: two questions with the same text are the
/// same question even if one carries a source keyword and the other does not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    text: String,
    /// Keyword the question was derived from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_keyword: Option<String>,
    /// Name of the owning brand, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    brand: Option<String>,
}

impl Question {
    /// Create a new question
    ///
    /// # Panics
    /// Panics if the text is empty or only whitespace
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        assert!(!text.trim().is_empty(), "Question cannot be empty");
        Self {
            text: text.trim().to_string(),
            source_keyword: None,
            brand: None,
        }
    }

    /// Try to create a new question, rejecting blank text
    pub fn try_new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::InvalidQuestion(
                "question text cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            text: text.trim().to_string(),
            source_keyword: None,
            brand: None,
        })
    }

    pub fn with_source_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.source_keyword = Some(keyword.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Get the question text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_keyword(&self) -> Option<&str> {
        self.source_keyword.as_deref()
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    /// Consume and return the inner text
    pub fn into_text(self) -> String {
        self.text
    }
}

impl PartialEq for Question {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Question {}

impl Hash for Question {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl From<&str> for Question {
    fn from(s: &str) -> Self {
        Question::new(s)
    }
}

impl From<String> for Question {
    fn from(s: String) -> Self {
        Question::new(s)
    }
}
