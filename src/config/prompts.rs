//! Prompt templates for Folio.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reply the generator is instructed to give when the context has no answer.
pub const FALLBACK_ANSWER: &str = "I cannot find this in the eBook.";

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub generation: GenerationPrompts,
    pub grading: GradingPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for answer generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationPrompts {
    pub user: String,
}

impl Default for GenerationPrompts {
    fn default() -> Self {
        Self {
            user: r#"You are a helpful assistant. Use ONLY the context below to answer.
If the answer isn't in the context, say: "I cannot find this in the eBook."

CONTEXT:
{{context}}

QUESTION:
{{question}}"#
                .to_string(),
        }
    }
}

/// Prompts for grading an answer against its context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingPrompts {
    pub system: String,
    pub user: String,
}

impl Default for GradingPrompts {
    fn default() -> Self {
        Self {
            system: r#"You grade answers produced by a question-answering assistant.
Respond with a single JSON object with exactly these fields:
- "is_grounded": boolean, true only if the answer is strictly based on the context
- "score": number from 0 to 100, your confidence in the answer"#
                .to_string(),
            user: r#"Is this answer supported by the context?
Context: {{context}}
Answer: {{answer}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = crate::config::Settings::expand_path(dir);

            let generation_path = custom_path.join("generation.toml");
            if generation_path.exists() {
                let content = std::fs::read_to_string(&generation_path)?;
                prompts.generation = toml::from_str(&content)?;
            }

            let grading_path = custom_path.join("grading.toml");
            if grading_path.exists() {
                let content = std::fs::read_to_string(&grading_path)?;
                prompts.grading = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are resolved in a single left-to-right pass; substituted
    /// values are never scanned again. Unknown placeholders are left as is.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let value = after
                .find("}}")
                .and_then(|end| vars.get(&after[..end]).map(|value| (end, value)));
            match value {
                Some((end, value)) => {
                    result.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str("{{");
                    rest = after;
                }
            }
        }

        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
