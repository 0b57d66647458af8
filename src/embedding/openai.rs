//! Embeddings over an OpenAI-compatible API.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{FolioError, Result};
use crate::openai::OpenAIClient;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Embedder backed by the `/embeddings` endpoint.
pub struct OpenAIEmbedder {
    client: OpenAIClient,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl OpenAIEmbedder {
    /// Create an embedder from settings.
    pub fn new(client: OpenAIClient, settings: &EmbeddingSettings) -> Self {
        Self::with_config(
            client,
            &settings.model,
            settings.dimensions as usize,
            settings.batch_size,
        )
    }

    /// Create an embedder with a custom model, dimensions and batch size.
    pub fn with_config(
        client: OpenAIClient,
        model: &str,
        dimensions: usize,
        batch_size: usize,
    ) -> Self {
        Self {
            client,
            model: model.to_string(),
            dimensions,
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| FolioError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.batch_size) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()))
                .build()
                .map_err(|e| FolioError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| FolioError::Embedding(format!("Embedding API error: {}", e)))?;

            if response.data.len() != chunk.len() {
                return Err(FolioError::Embedding(format!(
                    "Got {} embeddings for {} inputs",
                    response.data.len(),
                    chunk.len()
                )));
            }

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            for embedding_data in embeddings {
                if embedding_data.embedding.len() != self.dimensions {
                    return Err(FolioError::Embedding(format!(
                        "Model {} returned {} dimensions, expected {}",
                        self.model,
                        embedding_data.embedding.len(),
                        self.dimensions
                    )));
                }
                all_embeddings.push(embedding_data.embedding);
            }
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::create_client_with_timeout;
    use std::time::Duration;

    #[test]
    fn test_embedder_creation() {
        let client =
            create_client_with_timeout("http://localhost:1", "test", Duration::from_secs(1))
                .unwrap();
        let embedder = OpenAIEmbedder::new(client.clone(), &EmbeddingSettings::default());
        assert_eq!(embedder.dimensions(), 768);

        let embedder = OpenAIEmbedder::with_config(client, "text-embedding-3-small", 1536, 0);
        assert_eq!(embedder.dimensions(), 1536);
        assert_eq!(embedder.batch_size, 1);
    }
}
