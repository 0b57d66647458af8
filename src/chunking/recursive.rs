//! Recursive character splitting.
//!
//! Text is cut on the coarsest separator present (paragraph, line, word,
//! character). Pieces still too long are cut again with the next separator,
//! and short pieces are merged back up to the chunk size with a trailing
//! overlap. Lengths are counted in characters.

use super::{ChunkingConfig, TextChunk};
use std::collections::VecDeque;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splitter that prefers paragraph, then line, then word boundaries.
pub struct RecursiveSplitter {
    config: ChunkingConfig,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new(config: ChunkingConfig) -> Self {
        Self {
            config,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Split every page, numbering chunks across the whole document.
    pub fn split_pages(&self, pages: &[String]) -> Vec<TextChunk> {
        let mut chunks = Vec::new();
        for (page, text) in pages.iter().enumerate() {
            for content in self.split_text(text) {
                chunks.push(TextChunk {
                    content,
                    page: page as u32,
                    order: chunks.len() as u32,
                });
            }
        }
        chunks
    }

    /// Split a single text into chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut finer: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate.as_str();
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut short: Vec<String> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.config.chunk_size {
                short.push(piece);
                continue;
            }
            if !short.is_empty() {
                chunks.extend(self.merge(&short));
                short.clear();
            }
            if finer.is_empty() {
                chunks.push(piece);
            } else {
                chunks.extend(self.split_with(&piece, finer));
            }
        }

        if !short.is_empty() {
            chunks.extend(self.merge(&short));
        }

        chunks
    }

    /// Greedily join pieces up to the chunk size, carrying an overlap forward.
    fn merge(&self, pieces: &[String]) -> Vec<String> {
        let size = self.config.chunk_size;
        let overlap = self.config.chunk_overlap;

        let mut merged = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(piece);
            if total + len > size && !current.is_empty() {
                if let Some(chunk) = join_trimmed(&current) {
                    merged.push(chunk);
                }
                while total > overlap || (total + len > size && total > 0) {
                    match current.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
            current.push_back(piece.as_str());
            total += len;
        }

        if let Some(chunk) = join_trimmed(&current) {
            merged.push(chunk);
        }
        merged
    }
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split on `separator`, attaching each separator to the piece after it.
/// An empty separator splits into single characters.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut pieces = Vec::new();
    let mut parts = text.split(separator);
    if let Some(first) = parts.next() {
        if !first.is_empty() {
            pieces.push(first.to_string());
        }
    }
    for part in parts {
        pieces.push(format!("{}{}", separator, part));
    }
    pieces
}

fn join_trimmed(pieces: &VecDeque<&str>) -> Option<String> {
    let joined: String = pieces.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(count: usize) -> String {
        (0..count)
            .map(|i| format!("w{:04}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = RecursiveSplitter::default();
        let chunks = splitter.split_text("  Agentic AI plans and acts.  ");
        assert_eq!(chunks, vec!["Agentic AI plans and acts.".to_string()]);
    }

    #[test]
    fn test_chunks_respect_size_and_overlap() {
        let splitter = RecursiveSplitter::default();
        let text = words(600);
        let chunks = splitter.split_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 700, "chunk too long: {}", chunk.len());
        }
        for pair in chunks.windows(2) {
            let head: String = pair[1].chars().take(10).collect();
            assert!(pair[0].contains(&head), "no overlap between neighbours");
        }
        // Every word survives somewhere
        assert!(chunks.last().unwrap().ends_with("w0599"));
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let splitter = RecursiveSplitter::default();
        let first = "a".repeat(400);
        let second = "b".repeat(400);
        let text = format!("{}\n\n{}", first, second);

        let chunks = splitter.split_text(&text);
        assert_eq!(chunks, vec![first, second]);
    }

    #[test]
    fn test_unbroken_text_falls_back_to_characters() {
        let splitter = RecursiveSplitter::new(ChunkingConfig {
            chunk_size: 10,
            chunk_overlap: 2,
        });
        let chunks = splitter.split_text(&"x".repeat(25));
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let splitter = RecursiveSplitter::new(ChunkingConfig {
            chunk_size: 5,
            chunk_overlap: 1,
        });
        let chunks = splitter.split_text("ééééééééé");
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
    }

    #[test]
    fn test_split_pages_numbers_across_document() {
        let splitter = RecursiveSplitter::default();
        let pages = vec!["Page one.".to_string(), String::new(), "Page three.".to_string()];
        let chunks = splitter.split_pages(&pages);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page, 0);
        assert_eq!(chunks[1].page, 2);
        assert_eq!(chunks[1].order, 1);
    }
}
