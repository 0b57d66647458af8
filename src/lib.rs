//! Folio - Question answering over an eBook
//!
//! Ingests a single PDF into a hosted vector index and answers questions
//! using only what the book says.
//!
//! # Overview
//!
//! Folio allows you to:
//! - Download a PDF, split it into overlapping chunks and index their embeddings
//! - Retrieve the chunks closest to a question
//! - Generate an answer restricted to those chunks
//! - Grade the answer for groundedness and report a confidence
//! - Serve all of the above over a small HTTP API
//!
//! # Architecture
//!
//! - `config` - Settings, credentials and prompt templates
//! - `openai` - OpenAI-compatible client shared by embeddings and chat
//! - `embedding` - Embedding generation
//! - `llm` - Chat completion with structured output
//! - `vector_store` - Vector index abstraction (Pinecone, in-memory)
//! - `document_source` - PDF download and text extraction
//! - `chunking` - Recursive character splitting
//! - `ingest` - Ingestion pipeline
//! - `rag` - Retriever, generator, grader and the pipeline over them
//! - `services` - Wiring of the hosted services
//! - `server` - HTTP API
//!
//! # Example
//!
//! ```rust,no_run
//! use folio::config::{Credentials, Settings};
//! use folio::services::Services;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let credentials = Credentials::from_env()?;
//!     let services = Services::connect(settings, &credentials).await?;
//!
//!     let graded = services.pipeline().run("What is an AI agent?").await?;
//!     println!("{} (confidence {})", graded.generation, graded.confidence);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod document_source;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod openai;
pub mod rag;
pub mod server;
pub mod services;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{FolioError, Result};
