//! Vector index abstraction for Folio.
//!
//! Provides a trait-based interface over the hosted index and an in-memory
//! stand-in with the same contract.

mod memory;
mod pinecone;

pub use memory::MemoryVectorIndex;
pub use pinecone::PineconeIndex;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An embedded span of the source document, as stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Vector id. Fresh per ingestion run, so re-ingesting duplicates.
    pub id: Uuid,
    /// Text content of this chunk.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// URL of the originating document.
    pub source: String,
    /// Zero-based page the chunk was cut from.
    pub page: u32,
    /// Order of this chunk within its ingestion run.
    pub order: u32,
    /// When this chunk was ingested.
    pub ingested_at: DateTime<Utc>,
}

impl Chunk {
    /// Create a new chunk with a random id.
    pub fn new(
        content: String,
        embedding: Vec<f32>,
        source: String,
        page: u32,
        order: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            embedding,
            source,
            page,
            order,
            ingested_at: Utc::now(),
        }
    }
}

/// A chunk returned by a similarity query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub content: String,
    pub source: Option<String>,
    pub page: Option<u32>,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Index name.
    fn name(&self) -> &str;

    /// Dimensionality every stored vector must have.
    fn dimensions(&self) -> usize;

    /// Create the index if it is absent. Returns `true` when it was created.
    async fn ensure_exists(&self) -> Result<bool>;

    /// Append chunks to the index. Returns the number stored.
    async fn upsert_batch(&self, chunks: &[Chunk]) -> Result<usize>;

    /// Return up to `limit` chunks by descending similarity.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Get total chunk count.
    async fn document_count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_chunks_get_distinct_ids() {
        let a = Chunk::new("same".into(), vec![1.0], "src".into(), 0, 0);
        let b = Chunk::new("same".into(), vec![1.0], "src".into(), 0, 0);
        assert_ne!(a.id, b.id);
    }
}
