//! Answer generation constrained to the retrieved context.

use crate::config::Prompts;
use crate::error::Result;
use crate::llm::{ChatModel, OutputFormat};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Join retrieved chunks the way the generator sees them.
pub fn join_context(context: &[String]) -> String {
    context.join("\n\n")
}

/// Asks the chat model to answer only from the given context.
pub struct Generator {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl Generator {
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

    /// Render the generation prompt.
    pub fn prompt(&self, question: &str, context: &[String]) -> String {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), join_context(context));
        vars.insert("question".to_string(), question.to_string());
        self.prompts.render_with_custom(&self.prompts.generation.user, &vars)
    }

    #[instrument(skip(self, context), fields(chunks = context.len()))]
    pub async fn generate(&self, question: &str, context: &[String]) -> Result<String> {
        let prompt = self.prompt(question, context);
        let answer = self.model.complete(None, &prompt, OutputFormat::Text).await?;
        debug!("Generated answer of {} characters", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FALLBACK_ANSWER;
    use crate::testing::{ExtractiveModel, ScriptedModel};

    #[test]
    fn test_context_joined_with_blank_lines() {
        let joined = join_context(&["one".to_string(), "two".to_string()]);
        assert_eq!(joined, "one\n\ntwo");
    }

    #[test]
    fn test_question_with_placeholder_is_quoted_verbatim() {
        let generator = Generator::new(Arc::new(ScriptedModel::new("ok")));
        let context = vec!["CHUNK-TEXT".to_string()];

        let first = generator.prompt("What does {{context}} mean?", &context);
        assert!(first.contains("QUESTION:\nWhat does {{context}} mean?"));
        for _ in 0..64 {
            assert_eq!(generator.prompt("What does {{context}} mean?", &context), first);
        }
    }

    #[tokio::test]
    async fn test_prompt_contains_question_and_context() {
        let model = Arc::new(ScriptedModel::new("ok"));
        let generator = Generator::new(model.clone());

        generator
            .generate("What is ReAct?", &["ReAct interleaves reasoning and acting.".to_string()])
            .await
            .unwrap();

        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].contains("What is ReAct?"));
        assert!(prompts[0].contains("ReAct interleaves reasoning and acting."));
        assert!(prompts[0].contains(FALLBACK_ANSWER));
    }

    #[tokio::test]
    async fn test_answer_comes_from_context() {
        let generator = Generator::new(Arc::new(ExtractiveModel));
        let context = vec![
            "Memory lets an agent recall earlier steps.".to_string(),
            "Guardrails keep agents within policy limits.".to_string(),
        ];

        let answer = generator
            .generate("What do guardrails keep agents within?", &context)
            .await
            .unwrap();
        assert!(answer.contains("policy limits"));
    }

    #[tokio::test]
    async fn test_unrelated_context_yields_fallback() {
        let generator = Generator::new(Arc::new(ExtractiveModel));
        let context = vec!["Memory lets an agent recall earlier steps.".to_string()];

        let answer = generator
            .generate("Who won the 1998 football championship?", &context)
            .await
            .unwrap();
        assert_eq!(answer, FALLBACK_ANSWER);
    }
}
