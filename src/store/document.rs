//! The persisted document and its file-backed store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One decoded form submission: field name → field value.
pub type SubmissionRecord = BTreeMap<String, String>;

/// Errors raised while reading or writing the document file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file could not be read, created or written.
    #[error("store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but does not hold a document.
    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The writer task is gone; nothing can be persisted.
    #[error("store writer has stopped")]
    WriterClosed,
}

/// Every submission ever ingested, keyed by the time it was processed.
///
/// Keys are ordered, and because they are timestamps the serialized file
/// lists submissions oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreDocument {
    entries: BTreeMap<String, SubmissionRecord>,
}

impl StoreDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&SubmissionRecord> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SubmissionRecord)> {
        self.entries.iter()
    }

    /// Insert `record` under `key`, returning whatever it replaced.
    pub fn insert(&mut self, key: String, record: SubmissionRecord) -> Option<SubmissionRecord> {
        self.entries.insert(key, record)
    }
}

/// Format a document key from the moment a submission was processed.
///
/// Microsecond precision makes collisions unlikely but not impossible.
pub fn timestamp_key(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

/// Whole-document JSON persistence at a fixed path.
///
/// There is no partial-write protection: a crash mid-save can leave a
/// truncated file, which later loads report as [`StoreError::Corrupt`].
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the file holding an empty document if it does not exist yet.
    ///
    /// Returns `true` when a new file was written. An existing file is left
    /// untouched, even if it is corrupt.
    pub async fn init(&self) -> Result<bool, StoreError> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        if exists {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        self.save(&StoreDocument::new()).await?;
        tracing::info!(path = %self.path.display(), "Created empty store document");
        Ok(true)
    }

    /// Read and parse the whole document.
    pub async fn load(&self) -> Result<StoreDocument, StoreError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Insert `record` into `doc` under `key`. An existing entry under the
    /// same key is overwritten.
    pub fn merge(doc: &mut StoreDocument, record: SubmissionRecord, key: String) {
        if doc.insert(key, record).is_some() {
            tracing::debug!("Store key collision, previous entry overwritten");
        }
    }

    /// Serialize `doc` and overwrite the file with it.
    pub async fn save(&self, doc: &StoreDocument) -> Result<(), StoreError> {
        // Serializing string maps cannot fail.
        let bytes = serde_json::to_vec(doc).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(pairs: &[(&str, &str)]) -> SubmissionRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn init_creates_parent_and_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("storage").join("data.json"));

        assert!(store.init().await.unwrap());
        assert_eq!(tokio::fs::read_to_string(store.path()).await.unwrap(), "{}");
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn init_leaves_existing_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{"k":{"a":"b"}}"#).unwrap();

        let store = Store::new(&path);
        assert!(!store.init().await.unwrap());
        assert_eq!(store.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn load_reports_missing_file_as_io() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("absent.json"));
        assert!(matches!(store.load().await, Err(StoreError::Io { .. })));
    }

    #[tokio::test]
    async fn load_reports_invalid_json_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = Store::new(&path);
        assert!(matches!(store.load().await, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn load_rejects_wrong_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{"k":"not an object"}"#).unwrap();

        let store = Store::new(&path);
        assert!(matches!(store.load().await, Err(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn save_of_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(
            &path,
            r#"{"2024-01-01 10:00:00.000001":{"name":"Zoë","msg":"héllo"},"2024-01-02 10:00:00.000001":{}}"#,
        )
        .unwrap();
        let store = Store::new(&path);

        let before = store.load().await.unwrap();
        store.save(&before).await.unwrap();
        let after = store.load().await.unwrap();

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn save_writes_unescaped_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("data.json"));
        let mut doc = StoreDocument::new();
        Store::merge(&mut doc, record(&[("name", "Zoë")]), "k".into());

        store.save(&doc).await.unwrap();

        let text = tokio::fs::read_to_string(store.path()).await.unwrap();
        assert_eq!(text, r#"{"k":{"name":"Zoë"}}"#);
    }

    #[test]
    fn merge_adds_and_overwrites_same_key() {
        let mut doc = StoreDocument::new();
        Store::merge(&mut doc, record(&[("a", "1")]), "k1".into());
        Store::merge(&mut doc, record(&[("a", "2")]), "k2".into());
        assert_eq!(doc.len(), 2);

        Store::merge(&mut doc, record(&[("a", "3")]), "k1".into());
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.get("k1"), Some(&record(&[("a", "3")])));
        assert_eq!(doc.get("k2"), Some(&record(&[("a", "2")])));
    }

    #[test]
    fn timestamp_key_has_microseconds() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap()
            + chrono::Duration::microseconds(42);
        assert_eq!(timestamp_key(at), "2024-03-09 07:05:01.000042");
    }

    #[test]
    fn timestamp_keys_sort_chronologically() {
        let earlier = Local.with_ymd_and_hms(2024, 3, 9, 9, 59, 59).unwrap();
        let later = Local.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap();
        assert!(timestamp_key(earlier) < timestamp_key(later));
    }
}
