//! Error types for Folio.

use thiserror::Error;

/// Library-level error type for Folio operations.
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Language model error: {0}")]
    Llm(String),

    /// Structured model output did not match the expected shape.
    #[error("Failed to parse model output: {0}")]
    Parse(String),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Folio operations.
pub type Result<T> = std::result::Result<T, FolioError>;
