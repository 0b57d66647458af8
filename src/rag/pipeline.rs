//! The linear question-answering pipeline.
//!
//! Each stage returns a record carrying everything the next stage needs, so
//! a stage cannot run before the one it depends on.

use super::{Generator, Grader, Retriever};
use crate::error::Result;
use serde::Serialize;
use tracing::{info, instrument};

/// Output of the retrieval stage.
#[derive(Debug, Clone, Serialize)]
pub struct Retrieved {
    pub question: String,
    pub context: Vec<String>,
}

/// Output of the generation stage.
#[derive(Debug, Clone, Serialize)]
pub struct Generated {
    pub question: String,
    pub context: Vec<String>,
    pub generation: String,
}

/// Output of the grading stage.
#[derive(Debug, Clone, Serialize)]
pub struct Graded {
    pub question: String,
    pub context: Vec<String>,
    pub generation: String,
    pub confidence: f64,
}

/// Retrieve, generate, grade. No branches, no retries.
pub struct RagPipeline {
    retriever: Retriever,
    generator: Generator,
    grader: Grader,
}

impl RagPipeline {
    pub fn new(retriever: Retriever, generator: Generator, grader: Grader) -> Self {
        Self {
            retriever,
            generator,
            grader,
        }
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub async fn retrieve(&self, question: &str) -> Result<Retrieved> {
        let context = self.retriever.retrieve(question).await?;
        Ok(Retrieved {
            question: question.to_string(),
            context,
        })
    }

    pub async fn generate(&self, retrieved: Retrieved) -> Result<Generated> {
        let generation = self
            .generator
            .generate(&retrieved.question, &retrieved.context)
            .await?;
        Ok(Generated {
            question: retrieved.question,
            context: retrieved.context,
            generation,
        })
    }

    pub async fn grade(&self, generated: Generated) -> Result<Graded> {
        let grade = self
            .grader
            .grade(&generated.context, &generated.generation)
            .await?;
        Ok(Graded {
            question: generated.question,
            context: generated.context,
            generation: generated.generation,
            confidence: grade.confidence(),
        })
    }

    /// Retrieve and generate, skipping the grade.
    #[instrument(skip(self))]
    pub async fn answer(&self, question: &str) -> Result<Generated> {
        let retrieved = self.retrieve(question).await?;
        self.generate(retrieved).await
    }

    /// Run all three stages.
    #[instrument(skip(self))]
    pub async fn run(&self, question: &str) -> Result<Graded> {
        let retrieved = self.retrieve(question).await?;
        let generated = self.generate(retrieved).await?;
        let graded = self.grade(generated).await?;
        info!(
            "Answered with {} context chunks, confidence {}",
            graded.context.len(),
            graded.confidence
        );
        Ok(graded)
    }
}
