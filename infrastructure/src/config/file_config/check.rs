//! Check configuration from TOML (`[check]` section)

use serde::{Deserialize, Serialize};

/// Raw check configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCheckConfig {
    /// Deadline for each provider call, in seconds
    pub timeout_secs: u64,
    /// Store the raw answer text alongside each check
    pub keep_raw_answer: bool,
    /// Show a progress bar while providers answer
    pub show_progress: bool,
}

impl Default for FileCheckConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            keep_raw_answer: true,
            show_progress: true,
        }
    }
}
