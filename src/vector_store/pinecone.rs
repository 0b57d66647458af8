//! Pinecone-backed vector index over the REST API.
//!
//! The control plane lists and creates indexes; data-plane calls go to the
//! per-index host it reports.

use super::{Chunk, SearchResult, VectorIndex};
use crate::config::IndexSettings;
use crate::error::{FolioError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

/// Vectors per upsert request.
const UPSERT_BATCH_SIZE: usize = 100;

/// Polls while waiting for a freshly created index to become ready.
const READY_POLL_ATTEMPTS: usize = 120;
const READY_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Hosted vector index.
pub struct PineconeIndex {
    client: Client,
    control_plane_url: String,
    name: String,
    dimensions: usize,
    metric: String,
    cloud: String,
    region: String,
    host: OnceCell<String>,
}

impl PineconeIndex {
    /// Build a client for the named index.
    pub fn new(
        api_key: &str,
        name: &str,
        dimensions: usize,
        settings: &IndexSettings,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(api_key.trim())
                .map_err(|_| FolioError::Config("Invalid Pinecone API key".to_string()))?,
        );
        headers.insert(
            "X-Pinecone-API-Version",
            HeaderValue::from_str(&settings.api_version)
                .map_err(|_| FolioError::Config("Invalid Pinecone API version".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| FolioError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            control_plane_url: settings.control_plane_url.trim_end_matches('/').to_string(),
            name: name.to_string(),
            dimensions,
            metric: settings.metric.clone(),
            cloud: settings.cloud.clone(),
            region: settings.region.clone(),
            host: OnceCell::new(),
        })
    }

    async fn list_indexes(&self) -> Result<Vec<IndexDescription>> {
        let response = self
            .client
            .get(format!("{}/indexes", self.control_plane_url))
            .send()
            .await?;
        let list: IndexList = check_status(response, "List indexes").await?.json().await?;
        Ok(list.indexes)
    }

    async fn describe(&self) -> Result<IndexDescription> {
        let response = self
            .client
            .get(format!("{}/indexes/{}", self.control_plane_url, self.name))
            .send()
            .await?;
        Ok(check_status(response, "Describe index").await?.json().await?)
    }

    async fn create(&self) -> Result<()> {
        let request = CreateIndexRequest {
            name: &self.name,
            dimension: self.dimensions,
            metric: &self.metric,
            spec: IndexSpec {
                serverless: ServerlessSpec {
                    cloud: &self.cloud,
                    region: &self.region,
                },
            },
        };
        let response = self
            .client
            .post(format!("{}/indexes", self.control_plane_url))
            .json(&request)
            .send()
            .await?;
        check_status(response, "Create index").await?;
        Ok(())
    }

    async fn wait_until_ready(&self) -> Result<IndexDescription> {
        for _ in 0..READY_POLL_ATTEMPTS {
            let description = self.describe().await?;
            if description.status.as_ref().is_some_and(|s| s.ready) {
                return Ok(description);
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
        Err(FolioError::VectorIndex(format!(
            "Index '{}' did not become ready in time",
            self.name
        )))
    }

    /// Data-plane base URL, resolved once from the control plane.
    async fn data_url(&self) -> Result<&str> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let description = self.describe().await?;
                self.check_dimension(&description)?;
                description.base_url()
            })
            .await?;
        Ok(host.as_str())
    }

    fn check_dimension(&self, description: &IndexDescription) -> Result<()> {
        match description.dimension {
            Some(d) if d != self.dimensions => Err(FolioError::VectorIndex(format!(
                "Index '{}' has dimension {}, expected {}",
                self.name, d, self.dimensions
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self), fields(index = %self.name))]
    async fn ensure_exists(&self) -> Result<bool> {
        let existing = self.list_indexes().await?;
        if let Some(description) = existing.iter().find(|d| d.name == self.name) {
            self.check_dimension(description)?;
            debug!("Index '{}' already exists", self.name);
            return Ok(false);
        }

        info!(
            "Creating index '{}' ({} dims, {}, {}/{})",
            self.name, self.dimensions, self.metric, self.cloud, self.region
        );
        self.create().await?;
        let description = self.wait_until_ready().await?;
        let _ = self.host.set(description.base_url()?);
        Ok(true)
    }

    #[instrument(skip(self, chunks), fields(index = %self.name, count = chunks.len()))]
    async fn upsert_batch(&self, chunks: &[Chunk]) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }
        let url = format!("{}/vectors/upsert", self.data_url().await?);

        let mut upserted = 0;
        for batch in chunks.chunks(UPSERT_BATCH_SIZE) {
            let request = UpsertRequest {
                vectors: batch.iter().map(VectorRecord::from_chunk).collect(),
            };
            let response = self.client.post(&url).json(&request).send().await?;
            let body: UpsertResponse = check_status(response, "Upsert").await?.json().await?;
            upserted += body.upserted_count;
        }

        info!("Upserted {} vectors into '{}'", upserted, self.name);
        Ok(upserted)
    }

    #[instrument(skip(self, query_embedding), fields(index = %self.name))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let url = format!("{}/query", self.data_url().await?);
        let request = QueryRequest {
            vector: query_embedding,
            top_k: limit,
            include_metadata: true,
            include_values: false,
        };
        let response = self.client.post(&url).json(&request).send().await?;
        let body: QueryResponse = check_status(response, "Query").await?.json().await?;

        let results: Vec<SearchResult> = body
            .matches
            .into_iter()
            .take(limit)
            .map(QueryMatch::into_result)
            .collect();
        debug!("Found {} matching chunks", results.len());
        Ok(results)
    }

    async fn document_count(&self) -> Result<usize> {
        let url = format!("{}/describe_index_stats", self.data_url().await?);
        let response = self.client.post(&url).json(&serde_json::json!({})).send().await?;
        let stats: IndexStats = check_status(response, "Describe index stats").await?.json().await?;
        Ok(stats.total_vector_count)
    }
}

/// Turn a non-success response into a `VectorIndex` error carrying the body.
async fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    Err(FolioError::VectorIndex(format!("{} failed ({}): {}", what, status, body)))
}

// === Wire types ===

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    name: String,
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    status: Option<IndexStatus>,
}

impl IndexDescription {
    fn base_url(&self) -> Result<String> {
        let host = self
            .host
            .as_deref()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                FolioError::VectorIndex(format!("Index '{}' has no host yet", self.name))
            })?;
        let url = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        Ok(url.trim_end_matches('/').to_string())
    }
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: IndexSpec<'a>,
}

#[derive(Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Serialize)]
struct UpsertRequest {
    vectors: Vec<VectorRecord>,
}

#[derive(Serialize)]
struct VectorRecord {
    id: String,
    values: Vec<f32>,
    metadata: Map<String, Value>,
}

impl VectorRecord {
    fn from_chunk(chunk: &Chunk) -> Self {
        let mut metadata = Map::new();
        metadata.insert("text".to_string(), Value::from(chunk.content.clone()));
        metadata.insert("source".to_string(), Value::from(chunk.source.clone()));
        metadata.insert("page".to_string(), Value::from(chunk.page));
        metadata.insert("order".to_string(), Value::from(chunk.order));
        metadata.insert(
            "ingested_at".to_string(),
            Value::from(chunk.ingested_at.to_rfc3339()),
        );
        Self {
            id: chunk.id.to_string(),
            values: chunk.embedding.clone(),
            metadata,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Map<String, Value>,
}

impl QueryMatch {
    fn into_result(self) -> SearchResult {
        let content = self
            .metadata
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let source = self
            .metadata
            .get("source")
            .and_then(Value::as_str)
            .map(str::to_string);
        // Numbers written by other clients may come back as floats
        let page = self
            .metadata
            .get("page")
            .and_then(Value::as_f64)
            .map(|p| p as u32);

        SearchResult {
            id: self.id,
            content,
            source,
            page,
            score: self.score,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    #[serde(default)]
    total_vector_count: usize,
}
