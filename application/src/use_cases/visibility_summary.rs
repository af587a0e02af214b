//! Visibility summary use case
//!
//! Aggregates a brand's recent history: overall and per-provider metrics
//! plus the score trend.

use crate::ports::clock::Clock;
use crate::ports::history_store::{HistoryQuery, HistoryStore, TimeRange};
use crate::ports::storage::{bounded, StorageError};
use aeo_domain::{PeriodMetrics, Trend};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Number of checks on each side of the trend comparison
const TREND_WINDOW: usize = 7;

#[derive(Debug, Clone, Serialize)]
pub struct VisibilitySummary {
    pub brand: String,
    pub since: DateTime<Utc>,
    pub days: u32,
    pub metrics: PeriodMetrics,
    pub trend: Trend,
}

impl VisibilitySummary {
    pub fn is_empty(&self) -> bool {
        self.metrics.checks == 0
    }
}

pub struct VisibilitySummaryUseCase {
    history: Arc<dyn HistoryStore>,
    clock: Arc<dyn Clock>,
    storage_timeout: std::time::Duration,
}

impl VisibilitySummaryUseCase {
    pub fn new(
        history: Arc<dyn HistoryStore>,
        clock: Arc<dyn Clock>,
        storage_timeout: std::time::Duration,
    ) -> Self {
        Self {
            history,
            clock,
            storage_timeout,
        }
    }

    /// Summarize the last `days` days of checks for `brand`
    pub async fn execute(&self, brand: &str, days: u32) -> Result<VisibilitySummary, StorageError> {
        let since = self.clock.now() - Duration::days(i64::from(days));
        let query = HistoryQuery::for_brand(brand).with_range(TimeRange::since(since));
        let checks = bounded(self.storage_timeout, self.history.query(&query)).await?;
        debug!("Summarizing {} checks for {}", checks.len(), brand);

        let scores: Vec<f64> = checks.iter().map(|c| f64::from(c.score)).collect();

        Ok(VisibilitySummary {
            brand: brand.to_string(),
            since,
            days,
            metrics: PeriodMetrics::from_checks(&checks),
            trend: Trend::from_series(&scores, TREND_WINDOW),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, ManualClock, MemoryHistory};
    use aeo_domain::{classify, Brand, ProviderAnswer, ProviderId, TrendDirection, VisibilityCheck};

    async fn append(history: &MemoryHistory, provider: &str, text: &str, timestamp: DateTime<Utc>) {
        let answer = ProviderAnswer::new(ProviderId::new(provider), text, std::time::Duration::ZERO);
        let check = VisibilityCheck::new(
            "Acme",
            "Best CRM?",
            &answer,
            classify(text, &Brand::new("Acme")),
            timestamp,
        );
        history.append(check).await.unwrap();
    }

    #[tokio::test]
    async fn test_summary_covers_window_only() {
        let history = Arc::new(MemoryHistory::default());
        append(&history, "openai", "Acme works well.", at(1, 0)).await;
        append(&history, "openai", "Try Globex.", at(20, 0)).await;
        append(&history, "openai", "Acme works well.", at(21, 0)).await;
        append(&history, "gemini", "Acme is the best CRM.", at(22, 0)).await;

        let clock = Arc::new(ManualClock::new(at(25, 0)));
        let use_case = VisibilitySummaryUseCase::new(history, clock, std::time::Duration::from_secs(1));

        let summary = use_case.execute("Acme", 7).await.unwrap();

        assert_eq!(summary.metrics.checks, 3);
        assert_eq!(summary.metrics.by_provider.len(), 2);
        assert!((summary.metrics.mean_score - 170.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.trend.direction, TrendDirection::Up);
    }

    #[tokio::test]
    async fn test_empty_summary() {
        let use_case = VisibilitySummaryUseCase::new(
            Arc::new(MemoryHistory::default()),
            Arc::new(ManualClock::new(at(25, 0))),
            std::time::Duration::from_secs(1),
        );
        let summary = use_case.execute("Acme", 30).await.unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.trend.direction, TrendDirection::Stable);
    }
}
