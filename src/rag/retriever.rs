//! Query-time retrieval of the most similar chunks.

use crate::embedding::Embedder;
use crate::error::{FolioError, Result};
use crate::vector_store::{SearchResult, VectorIndex};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Embeds a query and returns the top-k chunks from the index.
pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever returning the 3 closest chunks.
    pub fn new(index: Arc<dyn VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            top_k: 3,
        }
    }

    /// Set the number of chunks returned.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Scored matches, best first.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        if query.trim().is_empty() {
            return Err(FolioError::InvalidInput("Query must not be empty".to_string()));
        }

        let query_embedding = self.embedder.embed(query).await?;
        let mut results = self.index.search(&query_embedding, self.top_k).await?;
        results.truncate(self.top_k);

        debug!("Retrieved {} chunks", results.len());
        Ok(results)
    }

    /// Chunk texts only, best first.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<String>> {
        Ok(self
            .search(query)
            .await?
            .into_iter()
            .map(|r| r.content)
            .collect())
    }
}
