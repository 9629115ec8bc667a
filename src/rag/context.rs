//! Context building for question answering.

use super::{rank_scored, ScoredChunk};
use crate::chunk_store::ChunkStore;
use crate::embedding::Embedder;
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Builds answer context from a chunk store slot.
pub struct ContextBuilder {
    store: Arc<dyn ChunkStore>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl ContextBuilder {
    pub fn new(store: Arc<dyn ChunkStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            top_k: 3,
        }
    }

    /// Set the number of chunks returned.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Rank the chunks in `slot` against `question`.
    ///
    /// An empty slot gives an empty context without calling the embedder.
    /// A failed question embedding fails the whole build.
    #[instrument(skip(self, question))]
    pub async fn build(&self, slot: &str, question: &str) -> Result<Vec<ScoredChunk>> {
        let records = self.store.load_all(slot).await?;
        if records.is_empty() {
            warn!("No chunk records stored in slot '{}'; answering without context", slot);
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(question).await?;
        let ranked = rank_scored(&query, &records, self.top_k);

        debug!(
            "Selected {} of {} chunks (best score {:?})",
            ranked.len(),
            records.len(),
            ranked.first().and_then(|c| c.score)
        );
        Ok(ranked)
    }
}

/// Join selected chunks into the prompt context.
pub fn format_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.chunk.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
