//! Configuration settings for Folio.

use crate::error::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub index: IndexSettings,
    pub ingest: IngestSettings,
    pub retrieval: RetrievalSettings,
    pub server: ServerSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Language model settings.
///
/// Any OpenAI-compatible endpoint works; the default points at the Gemini
/// compatibility layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Model used to generate answers.
    pub model: String,
    /// Model used to grade answers.
    pub grader_model: String,
    /// Sampling temperature for both models.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            grader_model: "gemini-3-flash-preview".to_string(),
            temperature: 0.0,
            timeout_secs: 300,
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions. Must match the index.
    pub dimensions: u32,
    /// Maximum texts per embedding request.
    pub batch_size: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "text-embedding-004".to_string(),
            dimensions: 768,
            batch_size: 100,
        }
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Similarity metric used when creating the index.
    pub metric: String,
    /// Serverless cloud provider.
    pub cloud: String,
    /// Serverless region.
    pub region: String,
    /// Control plane URL.
    pub control_plane_url: String,
    /// Value of the `X-Pinecone-API-Version` header.
    pub api_version: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            metric: "cosine".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            control_plane_url: "https://api.pinecone.io".to_string(),
            api_version: "2024-07".to_string(),
        }
    }
}

/// Document ingestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    /// URL of the PDF to ingest.
    pub source_url: String,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks.
    pub chunk_overlap: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            source_url: "https://konverge.ai/pdf/Ebook-Agentic-AI.pdf".to_string(),
            chunk_size: 700,
            chunk_overlap: 70,
        }
    }
}

/// Retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of chunks handed to the generator.
    pub top_k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Run the grading stage on every answer and report its confidence.
    pub grade_answers: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            grade_answers: true,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.ingest.chunk_size == 0 {
            return Err(FolioError::Config("ingest.chunk_size must be positive".to_string()));
        }
        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return Err(FolioError::Config(format!(
                "ingest.chunk_overlap ({}) must be smaller than ingest.chunk_size ({})",
                self.ingest.chunk_overlap, self.ingest.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(FolioError::Config("retrieval.top_k must be positive".to_string()));
        }
        if self.embedding.dimensions == 0 {
            return Err(FolioError::Config("embedding.dimensions must be positive".to_string()));
        }
        url::Url::parse(&self.ingest.source_url).map_err(|e| {
            FolioError::Config(format!("ingest.source_url is not a valid URL: {}", e))
        })?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("folio")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_ebook_pipeline() {
        let settings = Settings::default();
        assert_eq!(settings.ingest.chunk_size, 700);
        assert_eq!(settings.ingest.chunk_overlap, 70);
        assert_eq!(settings.retrieval.top_k, 3);
        assert_eq!(settings.embedding.dimensions, 768);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retrieval]\ntop_k = 5\n\n[server]\nport = 9000").unwrap();

        let settings = Settings::load_from(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(settings.retrieval.top_k, 5);
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.index.metric, "cosine");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.ingest.chunk_size, 700);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        let mut settings = Settings::default();
        settings.ingest.chunk_overlap = 700;
        assert!(matches!(settings.validate(), Err(FolioError::Config(_))));
    }
}
