//! Retrieval for question answering.
//!
//! Stored chunks are scored against a query embedding with cosine similarity
//! and the best `top_k` become the answer context.
//!
//! Cosine similarity is undefined when either vector has zero magnitude, when
//! the dimensions differ, or when the vectors are empty. Such records get no
//! score and rank after every scored record. Equal scores keep insertion order.

pub mod context;

pub use context::{format_context, ContextBuilder};

use crate::chunk_store::ChunkRecord;
use std::cmp::Ordering;

/// A chunk with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    /// Position of the record in the store.
    pub index: usize,
    pub chunk: String,
    /// `None` when the similarity is undefined.
    pub score: Option<f32>,
}

/// Compute cosine similarity between two vectors.
///
/// Returns `None` when the similarity is undefined.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let score = dot_product / (norm_a * norm_b);
    if score.is_finite() {
        Some(score.clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Descending by score, undefined scores last.
fn by_score_desc(a: &ScoredChunk, b: &ScoredChunk) -> Ordering {
    match (a.score, b.score) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Score every record and return the best `top_k`, best first.
pub fn rank_scored(query: &[f32], records: &[ChunkRecord], top_k: usize) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = records
        .iter()
        .enumerate()
        .map(|(index, record)| ScoredChunk {
            index,
            chunk: record.chunk.clone(),
            score: cosine_similarity(query, &record.embedding),
        })
        .collect();

    // `sort_by` is stable, so ties keep insertion order.
    scored.sort_by(by_score_desc);
    scored.truncate(top_k);
    scored
}

/// Return the texts of the `top_k` chunks most similar to `query`.
pub fn rank(query: &[f32], records: &[ChunkRecord], top_k: usize) -> Vec<String> {
    rank_scored(query, records, top_k)
        .into_iter()
        .map(|s| s.chunk)
        .collect()
}
