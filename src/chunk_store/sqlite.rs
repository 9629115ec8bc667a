//! SQLite-backed chunk store.
//!
//! Each slot is one row holding the JSON array of `{chunk, embedding}`
//! records, so replacing a slot is a single-statement write.

use super::{check_dimensions, ChunkRecord, ChunkStore, SlotInfo};
use crate::error::{Result, TldwError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS chunk_slots (
        name TEXT PRIMARY KEY,
        records_json TEXT NOT NULL,
        chunk_count INTEGER NOT NULL,
        saved_at TEXT NOT NULL
    );
"#;

/// SQLite-based chunk store.
pub struct SqliteChunkStore {
    conn: Mutex<Connection>,
}

impl SqliteChunkStore {
    /// Open (or create) a store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite chunk store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TldwError::Store(format!("Failed to acquire lock: {}", e)))
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait]
impl ChunkStore for SqliteChunkStore {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn save(&self, slot: &str, records: Vec<ChunkRecord>) -> Result<()> {
        check_dimensions(&records)?;
        let records_json = serde_json::to_string(&records)?;

        let conn = self.lock()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO chunk_slots (name, records_json, chunk_count, saved_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![slot, records_json, records.len() as i64, Utc::now().to_rfc3339()],
        )?;

        info!("Saved {} chunk records to slot '{}'", records.len(), slot);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load_all(&self, slot: &str) -> Result<Vec<ChunkRecord>> {
        let json: Option<String> = {
            let conn = self.lock()?;
            conn.query_row(
                "SELECT records_json FROM chunk_slots WHERE name = ?1",
                params![slot],
                |row| row.get(0),
            )
            .optional()?
        };

        let records: Vec<ChunkRecord> = match json {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                TldwError::Store(format!("Corrupt records in slot '{}': {}", slot, e))
            })?,
            None => Vec::new(),
        };

        debug!("Loaded {} chunk records from slot '{}'", records.len(), slot);
        Ok(records)
    }

    async fn slots(&self) -> Result<Vec<SlotInfo>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT name, chunk_count, saved_at FROM chunk_slots ORDER BY saved_at DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            let count: i64 = row.get(1)?;
            let saved_at: String = row.get(2)?;
            Ok(SlotInfo {
                name: row.get(0)?,
                chunk_count: count as usize,
                saved_at: parse_timestamp(&saved_at),
            })
        })?;

        let slots: Vec<SlotInfo> = rows.filter_map(|r| r.ok()).collect();
        Ok(slots)
    }
}
