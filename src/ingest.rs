//! Ingestion pipeline: document → chunks → embeddings → index.
//!
//! Every run appends. Chunk ids are fresh UUIDs, so ingesting the same
//! document twice stores it twice.

use crate::chunking::{ChunkingConfig, RecursiveSplitter};
use crate::document_source::DocumentSource;
use crate::embedding::Embedder;
use crate::error::{FolioError, Result};
use crate::vector_store::{Chunk, VectorIndex};
use std::sync::Arc;
use tracing::{info, instrument};

/// Coordinates a single ingestion run.
pub struct Ingestor {
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    splitter: RecursiveSplitter,
}

impl Ingestor {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            index,
            embedder,
            splitter: RecursiveSplitter::new(chunking),
        }
    }

    /// Ensure the index exists, then load, split, embed and store the document.
    #[instrument(
        skip(self, source),
        fields(source = %source.location(), index = %self.index.name())
    )]
    pub async fn run(&self, source: &dyn DocumentSource) -> Result<IngestReport> {
        if self.embedder.dimensions() != self.index.dimensions() {
            return Err(FolioError::Config(format!(
                "Embedding dimensions ({}) do not match index dimensions ({})",
                self.embedder.dimensions(),
                self.index.dimensions()
            )));
        }

        let index_created = self.index.ensure_exists().await?;
        if index_created {
            info!("Created index '{}'", self.index.name());
        }

        let pages = source.load_pages().await?;
        let text_chunks = self.splitter.split_pages(&pages);
        info!("Split {} pages into {} chunks", pages.len(), text_chunks.len());

        let texts: Vec<String> = text_chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != text_chunks.len() {
            return Err(FolioError::Embedding(format!(
                "Got {} embeddings for {} chunks",
                embeddings.len(),
                text_chunks.len()
            )));
        }

        let chunks: Vec<Chunk> = text_chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                Chunk::new(
                    chunk.content,
                    embedding,
                    source.location().to_string(),
                    chunk.page,
                    chunk.order,
                )
            })
            .collect();

        info!("Saving {} chunks to '{}'", chunks.len(), self.index.name());
        let chunks_indexed = self.index.upsert_batch(&chunks).await?;

        Ok(IngestReport {
            source: source.location().to_string(),
            pages: pages.len(),
            chunks_indexed,
            index_created,
        })
    }
}

/// Result of an ingestion run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    /// Where the document came from.
    pub source: String,
    /// Number of pages extracted.
    pub pages: usize,
    /// Number of chunks written to the index.
    pub chunks_indexed: usize,
    /// Whether this run created the index.
    pub index_created: bool,
}
