//! In-process history store

use aeo_application::{sort_by_timestamp, HistoryQuery, HistoryStore, StorageError};
use aeo_domain::VisibilityCheck;
use async_trait::async_trait;
use std::sync::Mutex;

/// History kept in a vector for the life of the process
#[derive(Default)]
pub struct InMemoryHistoryStore {
    checks: Mutex<Vec<VisibilityCheck>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, check: VisibilityCheck) -> Result<(), StorageError> {
        let mut checks = self
            .checks
            .lock()
            .map_err(|_| StorageError::Unavailable("history lock poisoned".to_string()))?;
        checks.push(check);
        Ok(())
    }

    async fn query(&self, query: &HistoryQuery) -> Result<Vec<VisibilityCheck>, StorageError> {
        let checks = self
            .checks
            .lock()
            .map_err(|_| StorageError::Unavailable("history lock poisoned".to_string()))?;
        let mut found: Vec<VisibilityCheck> =
            checks.iter().filter(|c| query.matches(c)).cloned().collect();
        sort_by_timestamp(&mut found);
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeo_domain::{classify, Brand, ProviderAnswer, ProviderId};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn check(brand: &str, day: u32) -> VisibilityCheck {
        let answer = ProviderAnswer::new(ProviderId::new("openai"), "Acme rocks.", Duration::ZERO);
        VisibilityCheck::new(
            brand,
            "Best CRM?",
            &answer,
            classify("Acme rocks.", &Brand::new(brand)),
            Utc.with_ymd_and_hms(2026, 3, day, 0, 0, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_query_filters_and_sorts() {
        let store = InMemoryHistoryStore::new();
        store.append(check("Acme", 5)).await.unwrap();
        store.append(check("Globex", 2)).await.unwrap();
        store.append(check("Acme", 1)).await.unwrap();

        let found = store.query(&HistoryQuery::for_brand("acme")).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].timestamp < found[1].timestamp);
    }
}
