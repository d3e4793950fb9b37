use crate::domain::ports::Storage;
use crate::utils::error::{RelayError, Result};
use std::collections::HashSet;

/// Durable set of article identifiers that have already been published.
///
/// Loaded once per run; every [`Ledger::record`] is flushed to storage before
/// it returns, so an identifier is never reported as recorded unless it is
/// on disk.
pub struct Ledger<S: Storage> {
    storage: S,
    path: String,
    entries: Vec<String>,
    index: HashSet<String>,
}

impl<S: Storage> Ledger<S> {
    pub async fn load(storage: S, path: impl Into<String>) -> Result<Self> {
        let path = path.into();

        let entries: Vec<String> = match storage.read_file(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| RelayError::LedgerError {
                path: path.clone(),
                message: format!("not a JSON array of identifiers: {}", e),
            })?,
            Err(RelayError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No ledger at {}, starting empty", path);
                Vec::new()
            }
            Err(e) => {
                return Err(RelayError::LedgerError {
                    path,
                    message: e.to_string(),
                })
            }
        };

        let mut ledger = Self {
            storage,
            path,
            entries: Vec::with_capacity(entries.len()),
            index: HashSet::with_capacity(entries.len()),
        };
        for id in entries {
            if ledger.index.insert(id.clone()) {
                ledger.entries.push(id);
            }
        }

        tracing::debug!("Loaded {} ledger entries from {}", ledger.len(), ledger.path);
        Ok(ledger)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Adds `id` and flushes. Recording a known id is a no-op.
    pub async fn record(&mut self, id: &str) -> Result<()> {
        if self.contains(id) {
            return Ok(());
        }

        self.entries.push(id.to_string());
        self.index.insert(id.to_string());

        if let Err(e) = self.flush().await {
            // 寫入失敗時回滾，記憶體與磁碟保持一致
            self.entries.pop();
            self.index.remove(id);
            return Err(RelayError::LedgerError {
                path: self.path.clone(),
                message: format!("failed to persist '{}': {}", id, e),
            });
        }

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers in the order they were recorded.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    async fn flush(&self) -> Result<()> {
        let data = serde_json::to_vec_pretty(&self.entries)?;
        self.storage.write_file(&self.path, &data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::{LocalStorage, MemoryStorage};
    use tempfile::TempDir;

    struct BrokenStorage;

    impl Storage for BrokenStorage {
        async fn read_file(&self, _path: &str) -> Result<Vec<u8>> {
            Ok(b"[]".to_vec())
        }

        async fn write_file(&self, _path: &str, _data: &[u8]) -> Result<()> {
            Err(RelayError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only filesystem",
            )))
        }
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let ledger = Ledger::load(MemoryStorage::new(), "posted.json").await.unwrap();

        assert!(ledger.is_empty());
        assert!(!ledger.contains("a1"));
    }

    #[tokio::test]
    async fn test_record_flushes_before_returning() {
        let storage = MemoryStorage::new();
        let mut ledger = Ledger::load(storage.clone(), "posted.json").await.unwrap();

        ledger.record("a1").await.unwrap();
        ledger.record("a2").await.unwrap();
        ledger.record("a1").await.unwrap();

        let persisted: Vec<String> =
            serde_json::from_slice(&storage.get_file("posted.json").await.unwrap()).unwrap();
        assert_eq!(persisted, vec!["a1", "a2"]);
        assert_eq!(ledger.entries(), &["a1".to_string(), "a2".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_ledger_is_fatal() {
        let storage = MemoryStorage::with_file("posted.json", b"{\"not\": \"a list\"}");
        let result = Ledger::load(storage, "posted.json").await;

        match result {
            Err(e @ RelayError::LedgerError { .. }) => assert!(e.is_fatal()),
            other => panic!("expected ledger error, got {:?}", other.map(|l| l.len())),
        }
    }

    #[tokio::test]
    async fn test_failed_flush_rolls_back() {
        let mut ledger = Ledger::load(BrokenStorage, "posted.json").await.unwrap();

        let err = ledger.record("a1").await.unwrap_err();

        assert!(err.is_fatal());
        assert!(!ledger.contains("a1"));
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_reload_from_disk_sees_previous_records() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().to_str().unwrap().to_string();

        let mut ledger = Ledger::load(LocalStorage::new(base.clone()), "state/posted.json")
            .await
            .unwrap();
        ledger.record("https://example.se/a1").await.unwrap();
        drop(ledger);

        let reloaded = Ledger::load(LocalStorage::new(base), "state/posted.json")
            .await
            .unwrap();
        assert!(reloaded.contains("https://example.se/a1"));
        assert_eq!(reloaded.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_entries_on_disk_are_collapsed() {
        let storage = MemoryStorage::with_file("posted.json", b"[\"a1\", \"a1\", \"a2\"]");
        let ledger = Ledger::load(storage, "posted.json").await.unwrap();

        assert_eq!(ledger.len(), 2);
    }
}
