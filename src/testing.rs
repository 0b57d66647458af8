//! Deterministic stand-ins for the hosted services, used by unit tests.

use crate::config::FALLBACK_ANSWER;
use crate::document_source::DocumentSource;
use crate::embedding::Embedder;
use crate::error::{FolioError, Result};
use crate::llm::{ChatModel, OutputFormat};
use crate::vector_store::cosine_similarity;
use async_trait::async_trait;
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// Bag-of-words embedder: each lowercase word bumps one hashed dimension.
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0; self.dimensions];
        for word in words(text) {
            let hash = word
                .bytes()
                .fold(0xcbf29ce484222325u64, |h, b| (h ^ b as u64).wrapping_mul(0x100000001b3));
            v[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Pages held in memory.
pub struct StaticSource {
    location: String,
    pages: Vec<String>,
}

impl StaticSource {
    pub fn new(location: &str, pages: Vec<String>) -> Self {
        Self {
            location: location.to_string(),
            pages,
        }
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    fn location(&self) -> &str {
        &self.location
    }

    async fn load_pages(&self) -> Result<Vec<String>> {
        Ok(self.pages.clone())
    }
}

/// Chat model that always replies with the same text and records its prompts.
pub struct ScriptedModel {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(
        &self,
        _system: Option<&str>,
        prompt: &str,
        _format: OutputFormat,
    ) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Chat model that answers with the context line sharing the most words
/// (longer than three letters) with the question, or the fallback phrase.
pub struct ExtractiveModel;

#[async_trait]
impl ChatModel for ExtractiveModel {
    async fn complete(
        &self,
        _system: Option<&str>,
        prompt: &str,
        _format: OutputFormat,
    ) -> Result<String> {
        let (context, question) = prompt
            .split_once("CONTEXT:")
            .and_then(|(_, rest)| rest.split_once("QUESTION:"))
            .ok_or_else(|| FolioError::Llm("prompt has no context section".to_string()))?;

        let asked: HashSet<String> = words(question).filter(|w| w.len() > 3).collect();
        let best = context
            .lines()
            .map(|line| (words(line).filter(|w| asked.contains(w)).count(), line.trim()))
            .filter(|(overlap, _)| *overlap > 0)
            .max_by_key(|(overlap, _)| *overlap);

        Ok(match best {
            Some((_, line)) => line.to_string(),
            None => FALLBACK_ANSWER.to_string(),
        })
    }
}

/// Chat model that always fails.
pub struct FailingModel;

#[async_trait]
impl ChatModel for FailingModel {
    async fn complete(
        &self,
        _system: Option<&str>,
        _prompt: &str,
        _format: OutputFormat,
    ) -> Result<String> {
        Err(FolioError::Llm("quota exceeded".to_string()))
    }
}

/// API key the Pinecone stand-in accepts.
pub const STUB_API_KEY: &str = "stub-key";

/// What the Pinecone stand-in has seen and stores.
#[derive(Default)]
pub struct StubRecord {
    /// Existing indexes as (name, dimension).
    pub indexes: Vec<(String, usize)>,
    /// Bodies of create-index requests.
    pub created: Vec<Value>,
    /// Describe calls still answered with `ready: false`.
    pub pending_ready: usize,
    pub describe_calls: usize,
    /// Number of vectors in each upsert request.
    pub upsert_batches: Vec<usize>,
    /// Stored vectors as (id, values, metadata).
    pub vectors: Vec<(String, Vec<f32>, Value)>,
    /// Bodies of query requests.
    pub queries: Vec<Value>,
}

struct StubShared {
    url: String,
    record: Mutex<StubRecord>,
}

impl StubShared {
    fn record(&self) -> MutexGuard<'_, StubRecord> {
        self.record.lock().unwrap()
    }

    fn description(&self, name: &str, dimension: usize, ready: bool) -> Value {
        let state = if ready { "Ready" } else { "Initializing" };
        json!({
            "name": name,
            "dimension": dimension,
            "metric": "cosine",
            "host": self.url,
            "status": { "ready": ready, "state": state }
        })
    }
}

/// Pinecone REST stand-in on a local port, serving both the control plane
/// and the data plane of every index it knows.
pub struct PineconeStub {
    pub url: String,
    shared: Arc<StubShared>,
}

impl PineconeStub {
    /// Start a stand-in that already holds the given indexes.
    pub async fn start(indexes: &[(&str, usize)]) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let shared = Arc::new(StubShared {
            url: url.clone(),
            record: Mutex::new(StubRecord {
                indexes: indexes.iter().map(|(n, d)| (n.to_string(), *d)).collect(),
                ..StubRecord::default()
            }),
        });

        let app = Router::new()
            .route("/indexes", get(stub_list).post(stub_create))
            .route("/indexes/{name}", get(stub_describe))
            .route("/vectors/upsert", post(stub_upsert))
            .route("/query", post(stub_query))
            .route("/describe_index_stats", post(stub_stats))
            .layer(middleware::from_fn(stub_require_key))
            .with_state(shared.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url, shared }
    }

    pub fn record(&self) -> MutexGuard<'_, StubRecord> {
        self.shared.record()
    }
}

async fn stub_require_key(request: Request, next: Next) -> Response {
    let key = request.headers().get("Api-Key").and_then(|v| v.to_str().ok());
    if key == Some(STUB_API_KEY) {
        next.run(request).await
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid API Key" }))).into_response()
    }
}

async fn stub_list(State(shared): State<Arc<StubShared>>) -> Json<Value> {
    let indexes: Vec<Value> = shared
        .record()
        .indexes
        .iter()
        .map(|(name, dimension)| shared.description(name, *dimension, true))
        .collect();
    Json(json!({ "indexes": indexes }))
}

async fn stub_create(
    State(shared): State<Arc<StubShared>>,
    Json(body): Json<Value>,
) -> Response {
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let dimension = body["dimension"].as_u64().unwrap_or_default() as usize;
    let mut record = shared.record();
    record.indexes.push((name.clone(), dimension));
    record.created.push(body);
    record.pending_ready = 1;
    drop(record);
    (StatusCode::CREATED, Json(shared.description(&name, dimension, false))).into_response()
}

async fn stub_describe(
    State(shared): State<Arc<StubShared>>,
    Path(name): Path<String>,
) -> Response {
    let mut record = shared.record();
    record.describe_calls += 1;
    let Some(dimension) = record.indexes.iter().find(|(n, _)| *n == name).map(|(_, d)| *d) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Resource not found" })))
            .into_response();
    };
    let ready = record.pending_ready == 0;
    record.pending_ready = record.pending_ready.saturating_sub(1);
    drop(record);
    Json(shared.description(&name, dimension, ready)).into_response()
}

async fn stub_upsert(
    State(shared): State<Arc<StubShared>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let vectors = body["vectors"].as_array().cloned().unwrap_or_default();
    let mut record = shared.record();
    record.upsert_batches.push(vectors.len());
    for vector in &vectors {
        record.vectors.push((
            vector["id"].as_str().unwrap_or_default().to_string(),
            values(&vector["values"]),
            vector["metadata"].clone(),
        ));
    }
    Json(json!({ "upsertedCount": vectors.len() }))
}

async fn stub_query(State(shared): State<Arc<StubShared>>, Json(body): Json<Value>) -> Json<Value> {
    let query = values(&body["vector"]);
    let top_k = body["topK"].as_u64().unwrap_or(10) as usize;
    let include_metadata = body["includeMetadata"].as_bool().unwrap_or(false);

    let mut record = shared.record();
    record.queries.push(body);
    let mut scored: Vec<(f32, &(String, Vec<f32>, Value))> = record
        .vectors
        .iter()
        .map(|v| (cosine_similarity(&query, &v.1), v))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let matches: Vec<Value> = scored
        .into_iter()
        .take(top_k)
        .map(|(score, (id, _, metadata))| {
            let mut m = json!({ "id": id, "score": score });
            if include_metadata {
                m["metadata"] = metadata.clone();
            }
            m
        })
        .collect();
    Json(json!({ "matches": matches, "namespace": "" }))
}

async fn stub_stats(State(shared): State<Arc<StubShared>>) -> Json<Value> {
    Json(json!({ "totalVectorCount": shared.record().vectors.len(), "dimension": 0 }))
}

fn values(value: &Value) -> Vec<f32> {
    value
        .as_array()
        .map(|a| a.iter().filter_map(Value::as_f64).map(|f| f as f32).collect())
        .unwrap_or_default()
}
