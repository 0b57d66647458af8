//! Splitting document text into overlapping, size-bounded chunks.

mod recursive;

pub use recursive::RecursiveSplitter;

use serde::{Deserialize, Serialize};

/// A span of document text ready to be embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Zero-based page the text came from.
    pub page: u32,
    /// Order of this chunk across the whole document.
    pub order: u32,
}

/// Configuration for chunking.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters carried over from the end of one chunk into the next.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 700,
            chunk_overlap: 70,
        }
    }
}

impl From<&crate::config::IngestSettings> for ChunkingConfig {
    fn from(settings: &crate::config::IngestSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
        }
    }
}
