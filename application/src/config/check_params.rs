//! Check parameters: orchestrator and storage deadlines.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Controls one check batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckParams {
    /// Deadline for each provider call.
    pub provider_timeout: Duration,
    /// Deadline for each HistoryStore operation.
    pub storage_timeout: Duration,
    /// Keep the raw answer text on stored checks.
    pub keep_raw_answer: bool,
}

impl Default for CheckParams {
    fn default() -> Self {
        Self {
            provider_timeout: Duration::from_secs(60),
            storage_timeout: Duration::from_secs(10),
            keep_raw_answer: true,
        }
    }
}

impl CheckParams {
    // ==================== Builder Methods ====================

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    pub fn with_keep_raw_answer(mut self, keep: bool) -> Self {
        self.keep_raw_answer = keep;
        self
    }
}
