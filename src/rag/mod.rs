//! RAG (Retrieval-Augmented Generation) over the ingested eBook.
//!
//! Three stages run in a fixed order: retrieve the closest chunks, generate
//! an answer from them, grade the answer against them.

mod generator;
mod grader;
mod pipeline;
mod retriever;

pub use generator::{join_context, Generator};
pub use grader::{GradeResult, Grader};
pub use pipeline::{Generated, Graded, RagPipeline, Retrieved};
pub use retriever::Retriever;
