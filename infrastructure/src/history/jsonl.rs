//! JSONL history store.
//!
//! Each [`VisibilityCheck`] is serialized as a single JSON line and appended
//! to the file through a buffered writer. Queries scan the whole file.
//! File IO runs on the blocking pool, so a storage deadline returns to the
//! caller even while the disk is stalled.

use aeo_application::{sort_by_timestamp, HistoryQuery, HistoryStore, StorageError};
use aeo_domain::VisibilityCheck;
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::task;
use tracing::{debug, warn};

/// Append-only history file, one check per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Every append is flushed before
/// it returns, and the writer flushes again once the last handle is dropped.
pub struct JsonlHistoryStore {
    file: Arc<HistoryFile>,
}

struct HistoryFile {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlHistoryStore {
    /// Open (or create) the history file at `path`.
    ///
    /// Creates parent directories if they don't exist. Existing records are
    /// kept; new checks go to the end.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Unavailable(format!(
                    "could not create history directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                StorageError::Unavailable(format!(
                    "could not open history file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        debug!("History file: {}", path.display());
        Ok(Self {
            file: Arc::new(HistoryFile {
                writer: Mutex::new(BufWriter::new(file)),
                path: path.to_path_buf(),
            }),
        })
    }

    /// Get the path to the history file.
    pub fn path(&self) -> &Path {
        &self.file.path
    }

    /// Run `operation` against the file on the blocking pool
    async fn blocking<T, F>(&self, operation: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&HistoryFile) -> Result<T, StorageError> + Send + 'static,
    {
        let file = Arc::clone(&self.file);
        task::spawn_blocking(move || operation(&file))
            .await
            .map_err(|e| StorageError::Unavailable(format!("history task failed: {}", e)))?
    }
}

impl HistoryFile {
    fn append_line(&self, line: &str) -> Result<(), StorageError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| StorageError::Unavailable("history writer lock poisoned".to_string()))?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<VisibilityCheck>, StorageError> {
        // Hold the writer so no half-written line is visible to the scan
        let _guard = self
            .writer
            .lock()
            .map_err(|_| StorageError::Unavailable("history writer lock poisoned".to_string()))?;

        let file = File::open(&self.path)?;
        let mut checks = Vec::new();

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let check: VisibilityCheck = serde_json::from_str(&line).map_err(|e| {
                StorageError::Corrupt(format!(
                    "{} line {}: {}",
                    self.path.display(),
                    index + 1,
                    e
                ))
            })?;
            checks.push(check);
        }

        Ok(checks)
    }
}

#[async_trait]
impl HistoryStore for JsonlHistoryStore {
    async fn append(&self, check: VisibilityCheck) -> Result<(), StorageError> {
        let line = serde_json::to_string(&check)
            .map_err(|e| StorageError::Corrupt(format!("could not encode check: {}", e)))?;
        self.blocking(move |file| file.append_line(&line)).await
    }

    async fn query(&self, query: &HistoryQuery) -> Result<Vec<VisibilityCheck>, StorageError> {
        let mut found: Vec<VisibilityCheck> = self
            .blocking(HistoryFile::read_all)
            .await?
            .into_iter()
            .filter(|c| query.matches(c))
            .collect();
        sort_by_timestamp(&mut found);
        Ok(found)
    }
}

impl Drop for HistoryFile {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock()
            && let Err(e) = writer.flush()
        {
            warn!("Could not flush history file {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeo_application::TimeRange;
    use aeo_domain::{classify, Brand, PeriodTag, ProviderAnswer, ProviderId, VisibilityStatus};
    use chrono::{DateTime, TimeZone, Utc};
    use std::time::Duration;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    fn check(provider: &str, text: &str, day: u32) -> VisibilityCheck {
        let answer = ProviderAnswer::new(ProviderId::new(provider), text, Duration::from_millis(40))
            .with_model("m-1");
        VisibilityCheck::new(
            "Acme",
            "Best CRM?",
            &answer,
            classify(text, &Brand::new("Acme")),
            at(day),
        )
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.jsonl");

        {
            let store = JsonlHistoryStore::open(&path).unwrap();
            store.append(check("openai", "Acme is great.", 3)).await.unwrap();
            store
                .append(check("gemini", "Consider Globex.", 1))
                .await
                .unwrap();
        }

        let store = JsonlHistoryStore::open(&path).unwrap();
        store.append(check("anthropic", "1. Globex\n2. Acme", 2)).await.unwrap();

        let found = store.query(&HistoryQuery::for_brand("Acme")).await.unwrap();
        assert_eq!(found.len(), 3);
        let providers: Vec<&str> = found.iter().map(|c| c.provider.as_str()).collect();
        assert_eq!(providers, vec!["gemini", "anthropic", "openai"]);
        assert_eq!(found[1].status, VisibilityStatus::Listed);
        assert_eq!(found[2].model.as_deref(), Some("m-1"));
    }

    #[tokio::test]
    async fn test_one_line_per_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let store = JsonlHistoryStore::open(&path).unwrap();

        store.append(check("openai", "Acme.", 1)).await.unwrap();
        store.append(check("openai", "Acme again.", 2)).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["brand"], "Acme");
        }
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_append_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlHistoryStore::open(dir.path().join("h.jsonl")).unwrap();

        for provider in ["openai", "anthropic", "gemini"] {
            store.append(check(provider, "Acme.", 4)).await.unwrap();
        }

        let found = store.query(&HistoryQuery::for_brand("Acme")).await.unwrap();
        let providers: Vec<&str> = found.iter().map(|c| c.provider.as_str()).collect();
        assert_eq!(providers, vec!["openai", "anthropic", "gemini"]);
    }

    #[tokio::test]
    async fn test_range_and_period_filters() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlHistoryStore::open(dir.path().join("h.jsonl")).unwrap();

        store
            .append(check("openai", "Acme.", 1).with_period(Some(PeriodTag::Control)))
            .await
            .unwrap();
        store
            .append(check("openai", "Acme.", 5).with_period(Some(PeriodTag::Test)))
            .await
            .unwrap();
        store.append(check("openai", "Acme.", 9)).await.unwrap();

        let ranged = store
            .query(&HistoryQuery::for_brand("Acme").with_range(TimeRange::between(at(1), at(9))))
            .await
            .unwrap();
        assert_eq!(ranged.len(), 2);

        let tagged = store
            .query(&HistoryQuery::for_brand("Acme").with_period(PeriodTag::Test))
            .await
            .unwrap();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].timestamp, at(5));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_appends_write_whole_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        let store = Arc::new(JsonlHistoryStore::open(&path).unwrap());

        let mut tasks = tokio::task::JoinSet::new();
        for day in 1..=20 {
            let store = Arc::clone(&store);
            tasks.spawn(async move { store.append(check("openai", "Acme.", day)).await });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap().unwrap();
        }

        let found = store.query(&HistoryQuery::for_brand("Acme")).await.unwrap();
        assert_eq!(found.len(), 20);
        assert_eq!(found[0].timestamp, at(1));
        assert_eq!(found[19].timestamp, at(20));
    }

    #[tokio::test]
    async fn test_corrupt_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.jsonl");
        std::fs::write(&path, "{not json}\n").unwrap();

        let store = JsonlHistoryStore::open(&path).unwrap();
        let err = store.query(&HistoryQuery::for_brand("Acme")).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(ref msg) if msg.contains("line 1")));
    }
}
