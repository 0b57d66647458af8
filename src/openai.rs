//! OpenAI-compatible client configuration.
//!
//! The same client type serves chat completions and embeddings; pointing
//! `api_base` at the Gemini compatibility endpoint routes both to Google.

use crate::config::LlmSettings;
use crate::error::{FolioError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Shared client type used by the embedder and the chat model.
pub type OpenAIClient = Client<OpenAIConfig>;

/// Create a client for the configured endpoint.
pub fn create_client(settings: &LlmSettings, api_key: &str) -> Result<OpenAIClient> {
    create_client_with_timeout(
        &settings.api_base,
        api_key,
        Duration::from_secs(settings.timeout_secs),
    )
}

/// Create a client with a custom timeout.
pub fn create_client_with_timeout(
    api_base: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<OpenAIClient> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FolioError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base.trim_end_matches('/'))
        .with_api_key(api_key);

    Ok(Client::with_config(config).with_http_client(http_client))
}
