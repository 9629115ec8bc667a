//! In-memory chunk store.
//!
//! Useful for testing and for a server that does not need to survive restarts.

use super::{check_dimensions, ChunkRecord, ChunkStore, SlotInfo};
use crate::error::{Result, TldwError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

struct Slot {
    records: Arc<Vec<ChunkRecord>>,
    saved_at: DateTime<Utc>,
}

/// In-memory chunk store.
pub struct MemoryChunkStore {
    slots: RwLock<HashMap<String, Slot>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryChunkStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> TldwError {
    TldwError::Store(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn save(&self, slot: &str, records: Vec<ChunkRecord>) -> Result<()> {
        check_dimensions(&records)?;

        let mut slots = self.slots.write().map_err(poisoned)?;
        slots.insert(
            slot.to_string(),
            Slot {
                records: Arc::new(records),
                saved_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn load_all(&self, slot: &str) -> Result<Vec<ChunkRecord>> {
        let records = {
            let slots = self.slots.read().map_err(poisoned)?;
            slots.get(slot).map(|s| s.records.clone())
        };
        Ok(records.map(|r| r.as_ref().clone()).unwrap_or_default())
    }

    async fn slots(&self) -> Result<Vec<SlotInfo>> {
        let slots = self.slots.read().map_err(poisoned)?;
        let mut infos: Vec<SlotInfo> = slots
            .iter()
            .map(|(name, slot)| SlotInfo {
                name: name.clone(),
                chunk_count: slot.records.len(),
                saved_at: slot.saved_at,
            })
            .collect();
        infos.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(infos)
    }
}
