//! Wiring of the hosted services.
//!
//! Builds the embedder, chat models and vector index from settings and
//! credentials, and hands out the ingestion and question-answering
//! components that share them.

use crate::chunking::ChunkingConfig;
use crate::config::{Credentials, Prompts, Settings};
use crate::document_source::PdfUrlSource;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::ingest::Ingestor;
use crate::llm::{ChatModel, OpenAIChatModel};
use crate::openai::create_client;
use crate::rag::{Generator, Grader, RagPipeline, Retriever};
use crate::vector_store::{PineconeIndex, VectorIndex};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Clients for every external dependency, built once.
pub struct Services {
    settings: Settings,
    prompts: Prompts,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    generator_model: Arc<dyn ChatModel>,
    grader_model: Arc<dyn ChatModel>,
}

impl Services {
    /// Build the services without touching the network.
    ///
    /// The index host is looked up on first use. Use [`Services::connect`] to
    /// resolve it up front.
    pub fn new(settings: Settings, credentials: &Credentials) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let client = create_client(&settings.llm, &credentials.llm_api_key)?;

        let embedder = Arc::new(OpenAIEmbedder::new(client.clone(), &settings.embedding));
        let generator_model = Arc::new(OpenAIChatModel::new(
            client.clone(),
            &settings.llm.model,
            settings.llm.temperature,
        ));
        let grader_model = Arc::new(OpenAIChatModel::new(
            client,
            &settings.llm.grader_model,
            settings.llm.temperature,
        ));

        let index = Arc::new(PineconeIndex::new(
            &credentials.index_api_key,
            &credentials.index_name,
            settings.embedding.dimensions as usize,
            &settings.index,
            Duration::from_secs(settings.llm.timeout_secs),
        )?);

        info!(
            "Using index '{}' with {} ({} dims), answering with {}",
            credentials.index_name,
            settings.embedding.model,
            settings.embedding.dimensions,
            settings.llm.model
        );

        Ok(Self {
            settings,
            prompts,
            embedder,
            index,
            generator_model,
            grader_model,
        })
    }

    /// Build the services and resolve the index up front.
    ///
    /// Fails when the index is missing, unreachable or rejects the key.
    pub async fn connect(settings: Settings, credentials: &Credentials) -> Result<Self> {
        let services = Self::new(settings, credentials)?;
        let count = services.index.document_count().await?;
        info!("Index '{}' holds {} vectors", services.index.name(), count);
        Ok(services)
    }

    /// Create services from prebuilt components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        generator_model: Arc<dyn ChatModel>,
        grader_model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            settings,
            prompts,
            embedder,
            index,
            generator_model,
            grader_model,
        }
    }

    pub fn index(&self) -> Arc<dyn VectorIndex> {
        self.index.clone()
    }

    pub fn retriever(&self) -> Retriever {
        Retriever::new(self.index.clone(), self.embedder.clone())
            .with_top_k(self.settings.retrieval.top_k)
    }

    /// The retrieve → generate → grade pipeline.
    pub fn pipeline(&self) -> RagPipeline {
        RagPipeline::new(
            self.retriever(),
            Generator::new(self.generator_model.clone()).with_prompts(self.prompts.clone()),
            Grader::new(self.grader_model.clone()).with_prompts(self.prompts.clone()),
        )
    }

    pub fn ingestor(&self) -> Ingestor {
        Ingestor::new(
            self.index.clone(),
            self.embedder.clone(),
            ChunkingConfig::from(&self.settings.ingest),
        )
    }

    /// The eBook source, or `url` when given.
    pub fn source(&self, url: Option<&str>) -> Result<PdfUrlSource> {
        let url = url.unwrap_or(&self.settings.ingest.source_url);
        PdfUrlSource::new(url, Duration::from_secs(self.settings.llm.timeout_secs))
    }
}
