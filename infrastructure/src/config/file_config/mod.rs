//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod brands;
mod check;
mod experiment;
mod logging;
mod output;
mod providers;
mod storage;

pub use brands::FileBrandConfig;
pub use check::FileCheckConfig;
pub use experiment::FileExperimentConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use providers::{FileAnthropicConfig, FileGeminiConfig, FileOpenAiConfig, FileProvidersConfig};
pub use storage::FileStorageConfig;

use aeo_application::{CheckParams, ExperimentPolicy};
use aeo_domain::{Brand, ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Check batch settings
    pub check: FileCheckConfig,
    /// Experiment report settings
    pub experiment: FileExperimentConfig,
    /// Where history and experiments are kept
    pub storage: FileStorageConfig,
    /// Provider backends and credentials
    pub providers: FileProvidersConfig,
    /// Brands known by name on the command line
    pub brands: Vec<FileBrandConfig>,
    /// Output settings
    pub output: FileOutputConfig,
    /// File logging
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Brands
        let mut seen = HashSet::new();
        for (index, brand) in self.brands.iter().enumerate() {
            let name = brand.name.trim();
            if name.is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyBrandName,
                    format!("brands[{}]: name cannot be empty", index),
                ));
                continue;
            }
            if !seen.insert(name.to_lowercase()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateBrand,
                    format!("brands[{}]: '{}' is defined more than once", index, name),
                ));
            }
        }

        // 2. Deadlines
        if self.check.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "check.timeout_secs must be greater than zero",
            ));
        }
        if self.storage.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "storage.timeout_secs must be greater than zero",
            ));
        }

        // 3. Providers
        if self.providers.enabled_ids().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::NoProviderEnabled,
                "every provider is disabled; enable at least one under [providers]",
            ));
        }

        // 4. Report thresholds
        if self.experiment.min_observations == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroMinObservations,
                "experiment.min_observations is 0; reports will never flag insufficient data",
            ));
        }

        issues
    }

    /// Look up a configured brand by name, ignoring case
    pub fn brand(&self, name: &str) -> Option<Brand> {
        self.brands
            .iter()
            .find(|b| b.name.trim().eq_ignore_ascii_case(name.trim()))
            .map(FileBrandConfig::to_brand)
    }

    pub fn check_params(&self) -> CheckParams {
        CheckParams::default()
            .with_provider_timeout(Duration::from_secs(self.check.timeout_secs))
            .with_storage_timeout(self.storage_timeout())
            .with_keep_raw_answer(self.check.keep_raw_answer)
    }

    pub fn experiment_policy(&self) -> ExperimentPolicy {
        ExperimentPolicy::default()
            .with_report(self.experiment.to_report_policy())
            .with_storage_timeout(self.storage_timeout())
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeo_domain::{OutputFormat, Severity};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[check]
timeout_secs = 30
keep_raw_answer = false

[experiment]
min_observations = 8

[storage]
data_dir = "/var/lib/aeo"

[providers.gemini]
enabled = false

[[brands]]
name = "Acme"
domain = "acme.com"
keywords = ["AcmeCRM"]
competitors = ["Globex", "Initech"]

[output]
format = "json"
color = false

[logging]
directory = "/var/log/aeo"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.check.timeout_secs, 30);
        assert!(!config.check.keep_raw_answer);
        assert_eq!(config.experiment.min_observations, 8);
        assert_eq!(config.providers.enabled_ids(), vec!["openai", "anthropic"]);
        assert_eq!(config.brands.len(), 1);
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
        assert!(config.logging.directory.is_some());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.check.timeout_secs, 60);
        assert!(config.brands.is_empty());
        assert!(config.output.color);
        assert!(config.output.format.is_none());
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validate_reports_every_issue() {
        let toml_str = r#"
[check]
timeout_secs = 0

[experiment]
min_observations = 0

[providers.openai]
enabled = false
[providers.anthropic]
enabled = false
[providers.gemini]
enabled = false

[[brands]]
name = "Acme"

[[brands]]
name = "acme"

[[brands]]
name = "  "
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        let codes: Vec<ConfigIssueCode> = issues.iter().map(|i| i.code).collect();

        assert!(codes.contains(&ConfigIssueCode::DuplicateBrand));
        assert!(codes.contains(&ConfigIssueCode::EmptyBrandName));
        assert!(codes.contains(&ConfigIssueCode::ZeroTimeout));
        assert!(codes.contains(&ConfigIssueCode::NoProviderEnabled));
        let zero_min = issues
            .iter()
            .find(|i| i.code == ConfigIssueCode::ZeroMinObservations)
            .unwrap();
        assert_eq!(zero_min.severity, Severity::Warning);
    }

    #[test]
    fn test_brand_lookup_ignores_case() {
        let config = FileConfig {
            brands: vec![FileBrandConfig {
                name: "Acme".to_string(),
                domain: Some("acme.com".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let brand = config.brand("ACME").unwrap();
        assert_eq!(brand.domain.as_deref(), Some("acme.com"));
        assert!(config.brand("Globex").is_none());
    }

    #[test]
    fn test_conversions() {
        let mut config = FileConfig::default();
        config.check.timeout_secs = 15;
        config.storage.timeout_secs = 3;

        let params = config.check_params();
        assert_eq!(params.provider_timeout, Duration::from_secs(15));
        assert_eq!(params.storage_timeout, Duration::from_secs(3));

        let policy = config.experiment_policy();
        assert_eq!(policy.storage_timeout, Duration::from_secs(3));
        assert_eq!(policy.report.min_observations, 5);
    }
}
