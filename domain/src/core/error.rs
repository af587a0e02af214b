//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid brand: {0}")]
    InvalidBrand(String),

    #[error("Invalid provider id: {0}")]
    InvalidProvider(String),

    #[error("Invalid experiment: {0}")]
    InvalidExperiment(String),

    /// A transition was requested that the current experiment state does not allow.
    #[error("Cannot {action} experiment in state '{state}': {reason}")]
    StateConflict {
        action: String,
        state: String,
        reason: String,
    },
}

impl DomainError {
    /// Check if this error is an experiment state conflict
    pub fn is_state_conflict(&self) -> bool {
        matches!(self, DomainError::StateConflict { .. })
    }
}
