//! Experiment configuration from TOML (`[experiment]` section)

use aeo_domain::ReportPolicy;
use serde::{Deserialize, Serialize};

/// Raw experiment configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExperimentConfig {
    /// Checks required in each period before a report is trusted
    pub min_observations: usize,
    /// Gap between control end and test start that earns a caveat, in days
    pub dormant_gap_warning_days: i64,
}

impl Default for FileExperimentConfig {
    fn default() -> Self {
        let policy = ReportPolicy::default();
        Self {
            min_observations: policy.min_observations,
            dormant_gap_warning_days: policy.dormant_gap_warning.num_days(),
        }
    }
}

impl FileExperimentConfig {
    pub fn to_report_policy(&self) -> ReportPolicy {
        ReportPolicy::default()
            .with_min_observations(self.min_observations)
            .with_dormant_gap_warning(chrono::Duration::days(self.dormant_gap_warning_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_report_policy() {
        let config = FileExperimentConfig::default();
        assert_eq!(config.to_report_policy(), ReportPolicy::default());
    }

    #[test]
    fn test_custom_values() {
        let config: FileExperimentConfig =
            toml::from_str("min_observations = 10\ndormant_gap_warning_days = 3").unwrap();
        let policy = config.to_report_policy();
        assert_eq!(policy.min_observations, 10);
        assert_eq!(policy.dormant_gap_warning, chrono::Duration::days(3));
    }
}
