//! Configuration file loading for aeo-tracker
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables prefixed `AEO_` (`AEO_CHECK__TIMEOUT_SECS=30`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./aeo-tracker.toml` or `./.aeo-tracker.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/aeo-tracker/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileAnthropicConfig, FileBrandConfig, FileCheckConfig, FileConfig, FileExperimentConfig,
    FileGeminiConfig, FileLoggingConfig, FileOpenAiConfig, FileOutputConfig, FileProvidersConfig,
    FileStorageConfig,
};
pub use loader::ConfigLoader;
