//! Groundedness grading of generated answers.

use super::generator::join_context;
use crate::config::Prompts;
use crate::error::Result;
use crate::llm::{complete_structured, ChatModel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// The grading model's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    /// Whether the answer is strictly based on the context.
    pub is_grounded: bool,
    /// Reported confidence, nominally 0-100. Passed through unchecked.
    pub score: f64,
}

impl GradeResult {
    /// Confidence after policy: ungrounded answers score zero.
    pub fn confidence(&self) -> f64 {
        if self.is_grounded {
            self.score
        } else {
            0.0
        }
    }
}

/// Asks the chat model whether an answer is supported by its context.
pub struct Grader {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl Grader {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    #[instrument(skip(self, context, answer))]
    pub async fn grade(&self, context: &[String], answer: &str) -> Result<GradeResult> {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), join_context(context));
        vars.insert("answer".to_string(), answer.to_string());

        let system = self.prompts.render_with_custom(&self.prompts.grading.system, &vars);
        let prompt = self.prompts.render_with_custom(&self.prompts.grading.user, &vars);

        let result: GradeResult =
            complete_structured(self.model.as_ref(), Some(&system), &prompt).await?;
        debug!(
            "Grade: grounded={} score={}",
            result.is_grounded, result.score
        );
        Ok(result)
    }
}
