//! Storage configuration from TOML (`[storage]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw storage configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// Directory holding the history and experiment files.
    /// Defaults to the platform data dir (`~/.local/share/aeo-tracker`).
    pub data_dir: Option<PathBuf>,
    /// Deadline for each store operation, in seconds
    pub timeout_secs: u64,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            timeout_secs: 10,
        }
    }
}

impl FileStorageConfig {
    /// Resolved data directory; falls back to `./.aeo-tracker` when the
    /// platform has no data dir
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("aeo-tracker"))
                .unwrap_or_else(|| PathBuf::from(".aeo-tracker"))
        })
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir().join("history.jsonl")
    }

    pub fn experiments_path(&self) -> PathBuf {
        self.data_dir().join("experiments.json")
    }
}
