//! Chunk store for question answering.
//!
//! Each named slot holds the chunk records of one transcript. Saving a slot
//! replaces its previous contents wholesale; readers see either the old or the
//! new record set, never a mix.

mod memory;
mod sqlite;

pub use memory::MemoryChunkStore;
pub use sqlite::SqliteChunkStore;

use crate::config::Settings;
use crate::error::{Result, TldwError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Slot used when no session is given.
pub const DEFAULT_SLOT: &str = "video_chunks";

/// A chunk paired with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub chunk: String,
    pub embedding: Vec<f32>,
}

impl ChunkRecord {
    pub fn new(chunk: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            chunk: chunk.into(),
            embedding,
        }
    }
}

/// Summary of a stored slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotInfo {
    pub name: String,
    pub chunk_count: usize,
    pub saved_at: DateTime<Utc>,
}

/// Trait for chunk store implementations.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Replace the records held in `slot`.
    async fn save(&self, slot: &str, records: Vec<ChunkRecord>) -> Result<()>;

    /// Load every record in `slot`; empty when nothing was saved.
    async fn load_all(&self, slot: &str) -> Result<Vec<ChunkRecord>>;

    /// List stored slots, most recently saved first.
    async fn slots(&self) -> Result<Vec<SlotInfo>>;
}

/// Reject record sets whose embeddings differ in dimension.
pub fn check_dimensions(records: &[ChunkRecord]) -> Result<()> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let expected = first.embedding.len();

    if let Some((index, bad)) = records
        .iter()
        .enumerate()
        .find(|(_, r)| r.embedding.len() != expected)
    {
        return Err(TldwError::Store(format!(
            "Embedding dimension mismatch: record {} has {} values, expected {}",
            index,
            bad.embedding.len(),
            expected
        )));
    }
    Ok(())
}

/// Create the store selected by `[store] provider`.
pub fn create_store(settings: &Settings) -> Result<Arc<dyn ChunkStore>> {
    match settings.store.provider.to_lowercase().as_str() {
        "sqlite" => Ok(Arc::new(SqliteChunkStore::new(&settings.sqlite_path())?)),
        "memory" => Ok(Arc::new(MemoryChunkStore::new())),
        other => Err(TldwError::Config(format!(
            "Unknown store provider: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_dimensions() {
        assert!(check_dimensions(&[]).is_ok());
        assert!(check_dimensions(&[
            ChunkRecord::new("a", vec![1.0, 2.0]),
            ChunkRecord::new("b", vec![3.0, 4.0]),
        ])
        .is_ok());

        let err = check_dimensions(&[
            ChunkRecord::new("a", vec![1.0, 2.0]),
            ChunkRecord::new("b", vec![3.0]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_record_json_layout() {
        let record = ChunkRecord::new("text", vec![0.5]);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, serde_json::json!({ "chunk": "text", "embedding": [0.5] }));
    }

    #[test]
    fn test_create_store_rejects_unknown_provider() {
        let mut settings = Settings::default();
        settings.store.provider = "redis".to_string();
        assert!(matches!(create_store(&settings), Err(TldwError::Config(_))));

        settings.store.provider = "memory".to_string();
        assert!(create_store(&settings).is_ok());
    }
}
