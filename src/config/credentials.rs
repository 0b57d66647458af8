//! Service credentials read from the environment.

use crate::error::{FolioError, Result};

/// API key for the language-model and embedding provider.
pub const LLM_API_KEY_VAR: &str = "GOOGLE_API_KEY";
/// API key for the vector index provider.
pub const INDEX_API_KEY_VAR: &str = "PINECONE_API_KEY";
/// Name of the vector index.
pub const INDEX_NAME_VAR: &str = "PINECONE_INDEX_NAME";

/// Keys and index name needed to reach the hosted services.
#[derive(Clone)]
pub struct Credentials {
    pub llm_api_key: String,
    pub index_api_key: String,
    pub index_name: String,
}

impl Credentials {
    /// Read credentials from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build credentials from an arbitrary variable lookup.
    ///
    /// Every variable must be present and non-empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let llm_api_key = read(LLM_API_KEY_VAR);
        let index_api_key = read(INDEX_API_KEY_VAR);
        let index_name = read(INDEX_NAME_VAR);

        match (llm_api_key, index_api_key, index_name) {
            (Some(llm_api_key), Some(index_api_key), Some(index_name)) => Ok(Self {
                llm_api_key,
                index_api_key,
                index_name,
            }),
            (llm, index, name) => {
                let missing: Vec<&str> = [
                    (llm.is_none(), LLM_API_KEY_VAR),
                    (index.is_none(), INDEX_API_KEY_VAR),
                    (name.is_none(), INDEX_NAME_VAR),
                ]
                .into_iter()
                .filter_map(|(absent, var)| absent.then_some(var))
                .collect();
                Err(FolioError::Config(format!(
                    "Missing environment variables: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("llm_api_key", &mask(&self.llm_api_key))
            .field("index_api_key", &mask(&self.index_api_key))
            .field("index_name", &self.index_name)
            .finish()
    }
}

/// Mask a secret for display, keeping only its last four characters.
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
