//! Comparison report for an experiment
//!
//! Derived on demand from the experiment windows and the checks that fall
//! inside them; never stored.

use crate::core::error::DomainError;
use crate::experiment::entities::{Experiment, ExperimentId, ExperimentState};
use crate::experiment::statistics::{two_proportion_test, Significance};
use crate::provider::ProviderId;
use crate::visibility::check::VisibilityCheck;
use crate::visibility::status::VisibilityStatus;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Knobs for report generation
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPolicy {
    /// Minimum checks per period before significance is computed
    pub min_observations: usize,
    /// Gap between control end and test start that earns a caveat
    pub dormant_gap_warning: Duration,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self {
            min_observations: 5,
            dormant_gap_warning: Duration::days(14),
        }
    }
}

impl ReportPolicy {
    pub fn with_min_observations(mut self, min: usize) -> Self {
        self.min_observations = min;
        self
    }

    pub fn with_dormant_gap_warning(mut self, gap: Duration) -> Self {
        self.dormant_gap_warning = gap;
        self
    }
}

/// Half-open time window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PeriodWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMetrics {
    pub provider: ProviderId,
    pub checks: usize,
    pub visible: usize,
    pub featured: usize,
    pub mean_score: f64,
    pub visibility_rate: f64,
    pub status_counts: BTreeMap<VisibilityStatus, usize>,
}

/// Aggregates over one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub checks: usize,
    pub visible: usize,
    pub featured: usize,
    pub mean_score: f64,
    pub visibility_rate: f64,
    pub featured_rate: f64,
    pub by_provider: Vec<ProviderMetrics>,
}

impl PeriodMetrics {
    pub fn from_checks<'a>(checks: impl IntoIterator<Item = &'a VisibilityCheck>) -> Self {
        let mut grouped: BTreeMap<ProviderId, Vec<&VisibilityCheck>> = BTreeMap::new();
        for check in checks {
            grouped.entry(check.provider.clone()).or_default().push(check);
        }

        let all: Vec<&VisibilityCheck> = grouped.values().flatten().copied().collect();
        let (checks, visible, featured, mean_score) = tally(&all);

        let by_provider = grouped
            .into_iter()
            .map(|(provider, checks)| {
                let (total, visible, featured, mean_score) = tally(&checks);
                let mut status_counts = BTreeMap::new();
                for check in &checks {
                    *status_counts.entry(check.status).or_insert(0) += 1;
                }
                ProviderMetrics {
                    provider,
                    checks: total,
                    visible,
                    featured,
                    mean_score,
                    visibility_rate: rate(visible, total),
                    status_counts,
                }
            })
            .collect();

        Self {
            checks,
            visible,
            featured,
            mean_score,
            visibility_rate: rate(visible, checks),
            featured_rate: rate(featured, checks),
            by_provider,
        }
    }

    pub fn provider(&self, provider: &ProviderId) -> Option<&ProviderMetrics> {
        self.by_provider.iter().find(|m| &m.provider == provider)
    }
}

fn tally(checks: &[&VisibilityCheck]) -> (usize, usize, usize, f64) {
    let total = checks.len();
    let visible = checks.iter().filter(|c| c.is_visible()).count();
    let featured = checks.iter().filter(|c| c.is_featured()).count();
    let mean = if total == 0 {
        0.0
    } else {
        checks.iter().map(|c| f64::from(c.score)).sum::<f64>() / total as f64
    };
    (total, visible, featured, mean)
}

fn rate(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Test minus control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsDelta {
    pub mean_score: f64,
    pub visibility_rate: f64,
    pub featured_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderComparison {
    pub provider: ProviderId,
    pub control_mean: f64,
    pub test_mean: f64,
    pub change: f64,
    pub control_checks: usize,
    pub test_checks: usize,
}

/// Something a reader should keep in mind when interpreting the numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Caveat {
    InsufficientData {
        control_checks: usize,
        test_checks: usize,
        minimum: usize,
    },
    LongDormantGap {
        days: i64,
    },
    Interim,
}

impl Caveat {
    pub fn message(&self) -> String {
        match self {
            Caveat::InsufficientData {
                control_checks,
                test_checks,
                minimum,
            } => format!(
                "insufficient data: {} control / {} test checks, need at least {} in each period",
                control_checks, test_checks, minimum
            ),
            Caveat::LongDormantGap { days } => format!(
                "{} days passed between control end and test start; outside factors may have shifted visibility",
                days
            ),
            Caveat::Interim => "test period is still running; results are provisional".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub experiment_id: ExperimentId,
    pub experiment_name: String,
    pub brand: String,
    pub hypothesis: String,
    pub control_window: PeriodWindow,
    pub test_window: PeriodWindow,
    pub control: PeriodMetrics,
    pub test: PeriodMetrics,
    pub delta: MetricsDelta,
    pub by_provider: Vec<ProviderComparison>,
    /// `None` when either period is below the minimum observation count
    pub significance: Option<Significance>,
    pub insufficient_data: bool,
    pub interim: bool,
    pub caveats: Vec<Caveat>,
    pub generated_at: DateTime<Utc>,
}

impl ComparisonReport {
    /// Build a report from candidate checks.
    ///
    /// Checks are filtered to the experiment's brand and target questions and
    /// assigned to a period by timestamp. A running test period uses `now` as
    /// its provisional end.
    pub fn build(
        experiment: &Experiment,
        checks: &[VisibilityCheck],
        policy: &ReportPolicy,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let (control_window, test_window, interim) = report_windows(experiment, now)?;

        let relevant = checks.iter().filter(|c| {
            c.brand.eq_ignore_ascii_case(&experiment.brand.name) && experiment.targets(&c.question)
        });
        let (control_checks, test_checks): (Vec<&VisibilityCheck>, Vec<&VisibilityCheck>) =
            relevant
                .filter(|c| control_window.contains(c.timestamp) || test_window.contains(c.timestamp))
                .partition(|c| control_window.contains(c.timestamp));

        let control = PeriodMetrics::from_checks(control_checks.iter().copied());
        let test = PeriodMetrics::from_checks(test_checks.iter().copied());

        let delta = MetricsDelta {
            mean_score: test.mean_score - control.mean_score,
            visibility_rate: test.visibility_rate - control.visibility_rate,
            featured_rate: test.featured_rate - control.featured_rate,
        };

        let insufficient_data =
            control.checks < policy.min_observations || test.checks < policy.min_observations;
        let significance = if insufficient_data {
            None
        } else {
            two_proportion_test(control.visible, control.checks, test.visible, test.checks)
        };

        let mut caveats = Vec::new();
        if insufficient_data {
            caveats.push(Caveat::InsufficientData {
                control_checks: control.checks,
                test_checks: test.checks,
                minimum: policy.min_observations,
            });
        }
        if let Some(gap) = experiment.dormant_gap()
            && gap > policy.dormant_gap_warning
        {
            caveats.push(Caveat::LongDormantGap {
                days: gap.num_days(),
            });
        }
        if interim {
            caveats.push(Caveat::Interim);
        }

        let by_provider = compare_providers(&control, &test);

        Ok(Self {
            experiment_id: experiment.id,
            experiment_name: experiment.name.clone(),
            brand: experiment.brand.name.clone(),
            hypothesis: experiment.hypothesis.clone(),
            control_window,
            test_window,
            control,
            test,
            delta,
            by_provider,
            significance,
            insufficient_data,
            interim,
            caveats,
            generated_at: now,
        })
    }
}

fn report_windows(
    experiment: &Experiment,
    now: DateTime<Utc>,
) -> Result<(PeriodWindow, PeriodWindow, bool), DomainError> {
    let conflict = |reason: &str| DomainError::StateConflict {
        action: "build report for".to_string(),
        state: experiment.state.as_str().to_string(),
        reason: reason.to_string(),
    };

    match &experiment.state {
        ExperimentState::Completed {
            control_start,
            control_end,
            test_start,
            test_end,
        } => Ok((
            PeriodWindow {
                start: *control_start,
                end: *control_end,
            },
            PeriodWindow {
                start: *test_start,
                end: *test_end,
            },
            false,
        )),
        ExperimentState::TestRunning {
            control_start,
            control_end,
            test_start,
        } => Ok((
            PeriodWindow {
                start: *control_start,
                end: *control_end,
            },
            PeriodWindow {
                start: *test_start,
                end: now.max(*test_start),
            },
            true,
        )),
        ExperimentState::Aborted { .. } => Err(conflict("aborted experiments cannot be reported")),
        _ => Err(conflict("test period has not started")),
    }
}

fn compare_providers(control: &PeriodMetrics, test: &PeriodMetrics) -> Vec<ProviderComparison> {
    let mut providers: Vec<&ProviderId> = control
        .by_provider
        .iter()
        .chain(test.by_provider.iter())
        .map(|m| &m.provider)
        .collect();
    providers.sort();
    providers.dedup();

    providers
        .into_iter()
        .map(|provider| {
            let c = control.provider(provider);
            let t = test.provider(provider);
            let control_mean = c.map(|m| m.mean_score).unwrap_or(0.0);
            let test_mean = t.map(|m| m.mean_score).unwrap_or(0.0);
            ProviderComparison {
                provider: provider.clone(),
                control_mean,
                test_mean,
                change: test_mean - control_mean,
                control_checks: c.map(|m| m.checks).unwrap_or(0),
                test_checks: t.map(|m| m.checks).unwrap_or(0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::brand::Brand;
    use crate::core::question::Question;
    use crate::experiment::entities::ExperimentAction;
    use crate::experiment::statistics::ConfidenceLevel;
    use crate::provider::ProviderAnswer;
    use crate::visibility::classifier::classify;
    use chrono::TimeZone;

    const QUESTION: &str = "What is the best CRM?";

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn experiment_through(test_end: Option<DateTime<Utc>>, test_start: DateTime<Utc>) -> Experiment {
        let mut e = Experiment::new(
            "Comparison page",
            Brand::new("Acme"),
            "Comparison page lifts visibility",
            vec![Question::new(QUESTION)],
            at(1, 0),
        )
        .unwrap();
        e.apply(ExperimentAction::StartControl, at(1, 0)).unwrap();
        e.apply(ExperimentAction::StopControl, at(8, 0)).unwrap();
        e.apply(ExperimentAction::StartTest { intervention: None }, test_start)
            .unwrap();
        if let Some(end) = test_end {
            e.apply(ExperimentAction::StopTest, end).unwrap();
        }
        e
    }

    fn check(provider: &str, text: &str, timestamp: DateTime<Utc>) -> VisibilityCheck {
        let answer = ProviderAnswer::new(
            ProviderId::new(provider),
            text,
            std::time::Duration::from_millis(5),
        );
        VisibilityCheck::new(
            "Acme",
            QUESTION,
            &answer,
            classify(text, &Brand::new("Acme")),
            timestamp,
        )
    }

    /// `visible` Mentioned checks followed by Not Found checks, one per hour from `start`
    fn period(visible: usize, total: usize, start: DateTime<Utc>) -> Vec<VisibilityCheck> {
        (0..total)
            .map(|i| {
                let text = if i < visible { "Acme works well." } else { "Try Globex." };
                let provider = if i % 2 == 0 { "openai" } else { "anthropic" };
                check(provider, text, start + Duration::hours(i as i64))
            })
            .collect()
    }

    #[test]
    fn test_four_vs_eleven_report() {
        let experiment = experiment_through(Some(at(15, 0)), at(8, 0));
        let mut checks = period(4, 20, at(1, 0));
        checks.extend(period(11, 20, at(8, 0)));

        let report =
            ComparisonReport::build(&experiment, &checks, &ReportPolicy::default(), at(16, 0)).unwrap();

        assert_eq!(report.control.checks, 20);
        assert_eq!(report.test.checks, 20);
        assert!((report.delta.visibility_rate - 0.35).abs() < 1e-9);
        assert!((report.delta.mean_score - 24.5).abs() < 1e-9);
        assert!(!report.insufficient_data);
        assert!(!report.interim);

        let sig = report.significance.unwrap();
        assert_eq!((sig.control_total, sig.test_total), (20, 20));
        assert_eq!((sig.control_visible, sig.test_visible), (4, 11));
        assert_eq!(sig.level, ConfidenceLevel::Medium);
        assert!(report.caveats.is_empty());
    }

    #[test]
    fn test_three_control_checks_is_insufficient() {
        let experiment = experiment_through(Some(at(15, 0)), at(8, 0));
        let mut checks = period(1, 3, at(1, 0));
        checks.extend(period(6, 10, at(8, 0)));

        let report =
            ComparisonReport::build(&experiment, &checks, &ReportPolicy::default(), at(16, 0)).unwrap();

        assert!(report.insufficient_data);
        assert!(report.significance.is_none());
        assert_eq!(report.control.checks, 3);
        assert!(matches!(
            report.caveats[0],
            Caveat::InsufficientData { control_checks: 3, test_checks: 10, minimum: 5 }
        ));
    }

    #[test]
    fn test_window_end_is_exclusive_and_foreign_checks_ignored() {
        let experiment = experiment_through(Some(at(15, 0)), at(8, 0));
        let mut other_question = check("openai", "Acme works well.", at(2, 0));
        other_question.question = "Unrelated question".to_string();
        let mut other_brand = check("openai", "Acme works well.", at(2, 0));
        other_brand.brand = "Globex".to_string();

        let checks = vec![
            check("openai", "Acme works well.", at(1, 0)),
            // lands exactly on control end, which is test start
            check("openai", "Try Globex.", at(8, 0)),
            // lands exactly on test end
            check("openai", "Acme works well.", at(15, 0)),
            other_question,
            other_brand,
        ];

        let report =
            ComparisonReport::build(&experiment, &checks, &ReportPolicy::default(), at(16, 0)).unwrap();
        assert_eq!(report.control.checks, 1);
        assert_eq!(report.test.checks, 1);
        assert_eq!(report.test.visible, 0);
    }

    #[test]
    fn test_per_provider_breakdown() {
        let experiment = experiment_through(Some(at(15, 0)), at(8, 0));
        let checks = vec![
            check("openai", "Acme is the best CRM.", at(2, 0)),
            check("gemini", "Try Globex.", at(2, 0)),
            check("openai", "Acme works well.", at(9, 0)),
        ];

        let report =
            ComparisonReport::build(&experiment, &checks, &ReportPolicy::default(), at(16, 0)).unwrap();

        let openai = report.control.provider(&ProviderId::new("openai")).unwrap();
        assert_eq!(openai.featured, 1);
        assert_eq!(openai.status_counts[&VisibilityStatus::Featured], 1);

        let providers: Vec<&str> = report.by_provider.iter().map(|p| p.provider.as_str()).collect();
        assert_eq!(providers, vec!["gemini", "openai"]);
        let openai = &report.by_provider[1];
        assert!((openai.change + 30.0).abs() < 1e-9);
        let gemini = &report.by_provider[0];
        assert_eq!(gemini.test_checks, 0);
    }

    #[test]
    fn test_interim_report_for_running_test() {
        let experiment = experiment_through(None, at(8, 0));
        let report =
            ComparisonReport::build(&experiment, &[], &ReportPolicy::default(), at(10, 0)).unwrap();
        assert!(report.interim);
        assert_eq!(report.test_window.end, at(10, 0));
        assert!(report.caveats.contains(&Caveat::Interim));
    }

    #[test]
    fn test_long_dormant_gap_caveat() {
        let experiment = experiment_through(Some(at(30, 0)), at(28, 0));
        let report =
            ComparisonReport::build(&experiment, &[], &ReportPolicy::default(), at(31, 0)).unwrap();
        assert!(report.caveats.contains(&Caveat::LongDormantGap { days: 20 }));
    }

    #[test]
    fn test_report_requires_test_period() {
        let mut experiment = Experiment::new(
            "Draft",
            Brand::new("Acme"),
            "h",
            vec![Question::new(QUESTION)],
            at(1, 0),
        )
        .unwrap();
        let err = ComparisonReport::build(&experiment, &[], &ReportPolicy::default(), at(2, 0))
            .unwrap_err();
        assert!(err.is_state_conflict());

        experiment.apply(ExperimentAction::Abort, at(2, 0)).unwrap();
        let err = ComparisonReport::build(&experiment, &[], &ReportPolicy::default(), at(3, 0))
            .unwrap_err();
        assert!(err.to_string().contains("aborted"));
    }
}
