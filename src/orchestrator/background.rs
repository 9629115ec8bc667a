//! Detached embedding and storage of transcript chunks.

use crate::chunk_store::{ChunkRecord, ChunkStore};
use crate::embedding::Embedder;
use crate::error::{Result, TldwError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// A background indexing run that did not complete.
#[derive(Debug, Clone, Serialize)]
pub struct IndexingFailure {
    pub task_id: Uuid,
    pub slot: String,
    pub message: String,
    pub failed_at: DateTime<Utc>,
}

/// Collects failures from indexing tasks nobody awaits.
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    failures: Arc<Mutex<Vec<IndexingFailure>>>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, failure: IndexingFailure) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure);
    }

    /// Snapshot of every failure recorded so far.
    pub fn failures(&self) -> Vec<IndexingFailure> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle to a spawned indexing task.
///
/// Dropping the handle detaches the task; it still runs to completion and
/// reports failures to the [`ErrorSink`].
#[derive(Debug)]
pub struct IndexingHandle {
    task_id: Uuid,
    slot: String,
    handle: JoinHandle<Result<usize>>,
}

impl IndexingHandle {
    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the task and return the number of records stored.
    pub async fn wait(self) -> Result<usize> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(TldwError::Store(format!(
                "Indexing task {} did not finish: {}",
                self.task_id, e
            ))),
        }
    }
}

/// Embed `chunks` and replace `slot` with the resulting records.
pub(crate) fn spawn_indexing(
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn ChunkStore>,
    slot: String,
    chunks: Vec<String>,
    sink: ErrorSink,
) -> IndexingHandle {
    let task_id = Uuid::new_v4();
    let task_slot = slot.clone();

    let handle = tokio::spawn(async move {
        let result = index_chunks(embedder.as_ref(), store.as_ref(), &task_slot, chunks).await;
        if let Err(e) = &result {
            warn!("Background indexing {} for '{}' failed: {}", task_id, task_slot, e);
            sink.record(IndexingFailure {
                task_id,
                slot: task_slot.clone(),
                message: e.to_string(),
                failed_at: Utc::now(),
            });
        }
        result
    });

    IndexingHandle {
        task_id,
        slot,
        handle,
    }
}

#[instrument(skip(embedder, store, chunks), fields(chunks = chunks.len()))]
async fn index_chunks(
    embedder: &dyn Embedder,
    store: &dyn ChunkStore,
    slot: &str,
    chunks: Vec<String>,
) -> Result<usize> {
    let embeddings = embedder.embed_batch(&chunks).await?;

    let records: Vec<ChunkRecord> = chunks
        .into_iter()
        .zip(embeddings)
        .map(|(chunk, embedding)| ChunkRecord::new(chunk, embedding))
        .collect();
    let count = records.len();

    store.save(slot, records).await?;
    info!("Indexed {} chunks into '{}'", count, slot);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_store::MemoryChunkStore;
    use async_trait::async_trait;

    struct LengthEmbedder {
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if self.fail_on == Some(text) {
                return Err(TldwError::transport("http://embed", "connection refused"));
            }
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    #[tokio::test]
    async fn test_indexing_replaces_slot() {
        let store = Arc::new(MemoryChunkStore::new());
        store
            .save("video", vec![ChunkRecord::new("stale", vec![0.0, 1.0])])
            .await
            .unwrap();
        let sink = ErrorSink::new();

        let handle = spawn_indexing(
            Arc::new(LengthEmbedder { fail_on: None }),
            store.clone(),
            "video".to_string(),
            vec!["one".to_string(), "three".to_string()],
            sink.clone(),
        );
        assert_eq!(handle.slot(), "video");
        assert_eq!(handle.wait().await.unwrap(), 2);

        let records = store.load_all("video").await.unwrap();
        assert_eq!(records[0], ChunkRecord::new("one", vec![3.0, 1.0]));
        assert_eq!(records[1], ChunkRecord::new("three", vec![5.0, 1.0]));
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_failure_goes_to_sink_and_keeps_old_records() {
        let store = Arc::new(MemoryChunkStore::new());
        store
            .save("video", vec![ChunkRecord::new("old", vec![1.0, 1.0])])
            .await
            .unwrap();
        let sink = ErrorSink::new();

        let handle = spawn_indexing(
            Arc::new(LengthEmbedder { fail_on: Some("b") }),
            store.clone(),
            "video".to_string(),
            vec!["a".to_string(), "b".to_string()],
            sink.clone(),
        );
        let task_id = handle.task_id();
        assert!(handle.wait().await.is_err());

        let failures = sink.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].task_id, task_id);
        assert_eq!(failures[0].slot, "video");
        assert!(failures[0].message.contains("connection refused"));

        let records = store.load_all("video").await.unwrap();
        assert_eq!(records, vec![ChunkRecord::new("old", vec![1.0, 1.0])]);
    }
}
