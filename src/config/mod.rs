//! Configuration module for Folio.
//!
//! Handles settings, service credentials and prompt templates.

mod credentials;
mod prompts;
mod settings;

pub use credentials::{mask, Credentials, INDEX_API_KEY_VAR, INDEX_NAME_VAR, LLM_API_KEY_VAR};
pub use prompts::{GenerationPrompts, GradingPrompts, Prompts, FALLBACK_ANSWER};
pub use settings::{
    EmbeddingSettings, GeneralSettings, IndexSettings, IngestSettings, LlmSettings,
    PromptSettings, RetrievalSettings, ServerSettings, Settings,
};
