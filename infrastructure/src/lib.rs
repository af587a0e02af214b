//! Infrastructure layer for aeo-tracker
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: LLM provider clients, history and experiment
//! stores, and configuration file loading.

pub mod config;
pub mod experiments;
pub mod history;
pub mod providers;

// Re-export commonly used types
pub use config::{ConfigLoader, FileBrandConfig, FileConfig, FileOutputConfig, FileProvidersConfig};
pub use experiments::{InMemoryExperimentRepository, JsonFileExperimentRepository};
pub use history::{InMemoryHistoryStore, JsonlHistoryStore};
pub use providers::{
    build_providers, AnthropicAdapter, GeminiAdapter, OpenAiAdapter, ProviderBuildError,
    KNOWN_PROVIDERS,
};
