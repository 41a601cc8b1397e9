//! Single-writer access to the document file.
//!
//! # Responsibilities
//! - Own the [`Store`] exclusively inside one task
//! - Run load → merge → save for each request in arrival order
//! - Report the outcome of every request back to its caller
//!
//! # Design Decisions
//! - Requests are queued on a bounded mpsc channel; senders wait when it is full
//! - Each caller waits for its own reply, so one handle has at most one
//!   request in flight; the queue only fills with several concurrent handles
//! - The task stops once every [`StoreHandle`] has been dropped

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::observability::metrics;
use crate::store::document::{Store, StoreError, SubmissionRecord};

struct PersistRequest {
    key: String,
    record: SubmissionRecord,
    reply: oneshot::Sender<Result<usize, StoreError>>,
}

/// Cloneable sender side of the writer task.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    tx: mpsc::Sender<PersistRequest>,
}

impl StoreHandle {
    /// Persist `record` under `key`.
    ///
    /// Resolves once the document has been rewritten, with the number of
    /// entries it now holds.
    pub async fn persist(&self, key: String, record: SubmissionRecord) -> Result<usize, StoreError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(PersistRequest { key, record, reply })
            .await
            .map_err(|_| StoreError::WriterClosed)?;
        rx.await.map_err(|_| StoreError::WriterClosed)?
    }
}

/// The task that owns the store.
pub struct StoreWriter {
    store: Store,
    rx: mpsc::Receiver<PersistRequest>,
}

impl StoreWriter {
    /// Spawn the writer task for `store`.
    pub fn spawn(store: Store, queue_depth: usize) -> (StoreHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(queue_depth.max(1));
        let writer = Self { store, rx };
        let task = tokio::spawn(writer.run());
        (StoreHandle { tx }, task)
    }

    async fn run(mut self) {
        tracing::debug!(path = %self.store.path().display(), "Store writer started");

        while let Some(request) = self.rx.recv().await {
            let PersistRequest { key, record, reply } = request;
            let result = self.apply(key, record).await;
            if let Ok(entries) = result {
                metrics::record_store_entries(entries);
            }
            // The caller may have given up waiting; the write still happened.
            let _ = reply.send(result);
        }

        tracing::debug!("Store writer stopped");
    }

    async fn apply(&self, key: String, record: SubmissionRecord) -> Result<usize, StoreError> {
        let mut doc = self.store.load().await?;
        Store::merge(&mut doc, record, key);
        self.store.save(&doc).await?;
        Ok(doc.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> SubmissionRecord {
        SubmissionRecord::from([("name".to_string(), name.to_string())])
    }

    #[tokio::test]
    async fn sequential_persists_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("data.json"));
        store.init().await.unwrap();
        let (handle, _task) = StoreWriter::spawn(store.clone(), 4);

        for i in 0..5 {
            let entries = handle.persist(format!("key-{i}"), record(&i.to_string())).await.unwrap();
            assert_eq!(entries, i + 1);
        }

        let doc = store.load().await.unwrap();
        assert_eq!(doc.len(), 5);
        assert_eq!(doc.get("key-3"), Some(&record("3")));
    }

    #[tokio::test]
    async fn concurrent_persists_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("data.json"));
        store.init().await.unwrap();
        let (handle, _task) = StoreWriter::spawn(store.clone(), 2);

        let mut tasks = Vec::new();
        for i in 0..20 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                handle.persist(format!("key-{i:02}"), record(&i.to_string())).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(store.load().await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn corrupt_file_fails_request_but_writer_survives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "garbage").unwrap();
        let store = Store::new(&path);
        let (handle, _task) = StoreWriter::spawn(store.clone(), 1);

        let err = handle.persist("k1".into(), record("a")).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "garbage");

        std::fs::write(&path, "{}").unwrap();
        assert_eq!(handle.persist("k2".into(), record("b")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn writer_exits_when_handles_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("data.json"));
        let (handle, task) = StoreWriter::spawn(store, 1);

        drop(handle);
        task.await.unwrap();
    }
}
