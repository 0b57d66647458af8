//! HTTP API for asking questions about the eBook.
//!
//! The pipeline is built once at startup. If that fails the server still
//! starts, and every question is answered with a 500 until restart.

use crate::config::{Credentials, Settings};
use crate::error::Result;
use crate::rag::RagPipeline;
use crate::services::Services;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, instrument};

/// Detail returned when the pipeline failed to load at startup.
pub const NOT_LOADED: &str = "AI Brain not loaded.";

/// Shared application state.
pub struct AppState {
    pipeline: Option<Arc<RagPipeline>>,
    grade_answers: bool,
}

impl AppState {
    pub fn new(pipeline: Option<Arc<RagPipeline>>, grade_answers: bool) -> Self {
        Self {
            pipeline,
            grade_answers,
        }
    }

    /// Build the pipeline from settings and environment credentials.
    ///
    /// Failures are logged and leave the state without a pipeline.
    pub async fn load(settings: Settings) -> Self {
        Self::load_with(settings, Credentials::from_env()).await
    }

    /// Build the pipeline from settings and the given credentials.
    ///
    /// Missing credentials and an index that cannot be resolved both leave
    /// the state without a pipeline.
    pub async fn load_with(settings: Settings, credentials: Result<Credentials>) -> Self {
        let grade_answers = settings.server.grade_answers;
        let services = match credentials {
            Ok(credentials) => Services::connect(settings, &credentials).await,
            Err(e) => Err(e),
        };
        match services {
            Ok(services) => {
                info!("AI Brain loaded");
                Self::new(Some(Arc::new(services.pipeline())), grade_answers)
            }
            Err(e) => {
                error!("Failed to load AI Brain: {}", e);
                Self::new(None, grade_answers)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }
}

/// Routes of the API, with permissive CORS.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/docs", get(docs))
        .route("/openapi.json", get(openapi))
        .route("/health", get(health))
        .route("/ask", post(ask))
        .layer(cors)
        .with_state(state)
}

/// Bind the listening socket.
pub async fn bind(host: &str, port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind(format!("{}:{}", host, port)).await
}

/// Serve on a bound listener until the process is stopped.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }
    axum::serve(listener, router(state)).await
}

// === Request/Response Types ===

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

fn internal_error(detail: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse { detail }),
    )
        .into_response()
}

// === Handlers ===

async fn root() -> Redirect {
    Redirect::temporary("/docs")
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "ready": state.is_ready() }))
}

#[instrument(skip_all)]
async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<QueryRequest>) -> Response {
    let Some(pipeline) = state.pipeline.as_ref() else {
        return internal_error(NOT_LOADED.to_string());
    };

    let result = if state.grade_answers {
        pipeline.run(&req.question).await.map(|graded| AnswerResponse {
            answer: graded.generation,
            confidence: Some(graded.confidence),
        })
    } else {
        pipeline.answer(&req.question).await.map(|generated| AnswerResponse {
            answer: generated.generation,
            confidence: None,
        })
    };

    match result {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!("Failed to answer question: {}", e);
            internal_error(e.to_string())
        }
    }
}

async fn docs() -> Html<&'static str> {
    Html(DOCS_PAGE)
}

async fn openapi() -> impl IntoResponse {
    Json(serde_json::json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Folio",
            "description": "Question answering over the Agentic AI eBook.",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": {
            "/ask": {
                "post": {
                    "summary": "Ask a question about the eBook",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/QueryRequest" }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "Answer drawn from the eBook",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/AnswerResponse" }
                                }
                            }
                        },
                        "500": {
                            "description": "Pipeline not loaded or failed",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                }
                            }
                        }
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Liveness and readiness",
                    "responses": { "200": { "description": "Service status" } }
                }
            }
        },
        "components": {
            "schemas": {
                "QueryRequest": {
                    "type": "object",
                    "required": ["question"],
                    "properties": { "question": { "type": "string" } }
                },
                "AnswerResponse": {
                    "type": "object",
                    "required": ["answer"],
                    "properties": {
                        "answer": { "type": "string" },
                        "confidence": { "type": "number" }
                    }
                },
                "ErrorResponse": {
                    "type": "object",
                    "properties": { "detail": { "type": "string" } }
                }
            }
        }
    }))
}

const DOCS_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Folio API</title></head>
<body>
<h1>Folio API</h1>
<p>Ask questions about the Agentic AI eBook. Answers come only from the book.</p>
<h2>POST /ask</h2>
<pre>curl -X POST http://localhost:8000/ask \
  -H 'Content-Type: application/json' \
  -d '{"question": "What is an AI agent?"}'</pre>
<p>Returns <code>{"answer": "...", "confidence": 0-100}</code>.</p>
<h2>GET /health</h2>
<p>Returns <code>{"status": "ok", "ready": true}</code>.</p>
<p>OpenAPI document: <a href="/openapi.json">/openapi.json</a></p>
</body>
</html>
"#;
