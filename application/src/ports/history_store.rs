//! History store port
//!
//! Durable, append-only log of [`VisibilityCheck`] records.

use crate::ports::storage::StorageError;
use aeo_domain::{PeriodTag, VisibilityCheck};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Half-open time range `[start, end)`; either side may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn since(start: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|s| at >= s) && self.end.is_none_or(|e| at < e)
    }
}

/// Filter for [`HistoryStore::query`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub brand: String,
    pub question: Option<String>,
    pub range: Option<TimeRange>,
    pub period: Option<PeriodTag>,
}

impl HistoryQuery {
    pub fn for_brand(brand: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            question: None,
            range: None,
            period: None,
        }
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    pub fn with_range(mut self, range: TimeRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_period(mut self, period: PeriodTag) -> Self {
        self.period = Some(period);
        self
    }

    /// Brand comparison ignores ASCII case; question text must match exactly
    pub fn matches(&self, check: &VisibilityCheck) -> bool {
        check.brand.eq_ignore_ascii_case(&self.brand)
            && self.question.as_ref().is_none_or(|q| &check.question == q)
            && self.range.is_none_or(|r| r.contains(check.timestamp))
            && self.period.is_none_or(|p| check.period == Some(p))
    }
}

/// Append-only store of visibility checks
///
/// `query` returns matches ordered by timestamp; checks with equal timestamps
/// keep their insertion order. Reads may race with appends and see either
/// the old or the new tail.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, check: VisibilityCheck) -> Result<(), StorageError>;

    async fn query(&self, query: &HistoryQuery) -> Result<Vec<VisibilityCheck>, StorageError>;
}

/// Stable sort by timestamp, keeping insertion order for ties
pub fn sort_by_timestamp(checks: &mut [VisibilityCheck]) {
    checks.sort_by_key(|c| c.timestamp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeo_domain::{classify, Brand, ProviderAnswer, ProviderId};
    use chrono::TimeZone;
    use std::time::Duration;

    fn check(brand: &str, question: &str, hour: u32) -> VisibilityCheck {
        let answer = ProviderAnswer::new(ProviderId::new("openai"), "Acme", Duration::ZERO);
        VisibilityCheck::new(
            brand,
            question,
            &answer,
            classify("Acme", &Brand::new("Acme")),
            Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_query_matches_filters() {
        let at = |h| Utc.with_ymd_and_hms(2026, 3, 1, h, 0, 0).unwrap();
        let query = HistoryQuery::for_brand("acme")
            .with_question("Q1")
            .with_range(TimeRange::between(at(2), at(5)));

        assert!(query.matches(&check("Acme", "Q1", 2)));
        assert!(!query.matches(&check("Acme", "Q1", 5)));
        assert!(!query.matches(&check("Acme", "Q2", 3)));
        assert!(!query.matches(&check("Globex", "Q1", 3)));
    }

    #[test]
    fn test_query_period_filter() {
        let query = HistoryQuery::for_brand("Acme").with_period(PeriodTag::Test);
        assert!(!query.matches(&check("Acme", "Q1", 1)));
        assert!(query.matches(&check("Acme", "Q1", 1).with_period(Some(PeriodTag::Test))));
    }

    #[test]
    fn test_sort_is_stable() {
        let mut checks = vec![
            check("Acme", "late", 9),
            check("Acme", "first", 3),
            check("Acme", "second", 3),
        ];
        sort_by_timestamp(&mut checks);
        let order: Vec<&str> = checks.iter().map(|c| c.question.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "late"]);
    }
}
