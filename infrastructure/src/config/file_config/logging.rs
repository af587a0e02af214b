//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write a daily rolling log file into this directory
    pub directory: Option<PathBuf>,
    /// Filter directive for the file log (e.g. "debug"); defaults to the
    /// console level
    pub level: Option<String>,
}
