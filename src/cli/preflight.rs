//! Pre-flight checks before expensive operations.
//!
//! Validates that credentials are available before starting operations
//! that would otherwise fail midway.

use crate::config::{mask, Credentials, INDEX_API_KEY_VAR, INDEX_NAME_VAR, LLM_API_KEY_VAR};
use crate::error::Result;

/// Operations that talk to the hosted services.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Ingestion needs the model and index credentials.
    Ingest,
    /// Asking needs the model and index credentials.
    Ask,
    /// Search embeds the query and reads the index.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns the credentials if all checks pass, or an error naming what's missing.
pub fn check(operation: Operation) -> Result<Credentials> {
    let credentials = Credentials::from_env()?;
    tracing::debug!(
        "Pre-flight for {:?}: {}={}, {}={}, {}={}",
        operation,
        LLM_API_KEY_VAR,
        mask(&credentials.llm_api_key),
        INDEX_API_KEY_VAR,
        mask(&credentials.index_api_key),
        INDEX_NAME_VAR,
        credentials.index_name
    );
    Ok(credentials)
}

/// Hint printed after a failed check.
pub fn hint() -> String {
    format!(
        "Set {}, {} and {} in the environment or a .env file.",
        LLM_API_KEY_VAR, INDEX_API_KEY_VAR, INDEX_NAME_VAR
    )
}
