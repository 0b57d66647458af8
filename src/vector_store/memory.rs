//! In-memory vector index implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, Chunk, SearchResult, VectorIndex};
use crate::error::{FolioError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// In-memory vector index.
///
/// Chunks are kept in insertion order, which is also the tie-break order
/// for equal scores.
pub struct MemoryVectorIndex {
    name: String,
    dimensions: usize,
    created: AtomicBool,
    chunks: RwLock<Vec<Chunk>>,
}

impl MemoryVectorIndex {
    /// Create a new, not yet "created", in-memory index.
    pub fn new(name: &str, dimensions: usize) -> Self {
        Self {
            name: name.to_string(),
            dimensions,
            created: AtomicBool::new(false),
            chunks: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of all stored chunks.
    pub fn chunks(&self) -> Result<Vec<Chunk>> {
        let chunks = self.chunks.read().map_err(lock_error)?;
        Ok(chunks.clone())
    }
}

fn lock_error<T>(e: std::sync::PoisonError<T>) -> FolioError {
    FolioError::VectorIndex(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn ensure_exists(&self) -> Result<bool> {
        Ok(!self.created.swap(true, Ordering::SeqCst))
    }

    async fn upsert_batch(&self, chunks: &[Chunk]) -> Result<usize> {
        if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != self.dimensions) {
            return Err(FolioError::VectorIndex(format!(
                "Vector dimension {} does not match index dimension {}",
                bad.embedding.len(),
                self.dimensions
            )));
        }

        let mut store = self.chunks.write().map_err(lock_error)?;
        store.extend_from_slice(chunks);
        Ok(chunks.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let chunks = self.chunks.read().map_err(lock_error)?;

        let mut results: Vec<SearchResult> = chunks
            .iter()
            .map(|chunk| SearchResult {
                id: chunk.id.to_string(),
                content: chunk.content.clone(),
                source: Some(chunk.source.clone()),
                page: Some(chunk.page),
                score: cosine_similarity(query_embedding, &chunk.embedding),
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn document_count(&self) -> Result<usize> {
        let chunks = self.chunks.read().map_err(lock_error)?;
        Ok(chunks.len())
    }
}
