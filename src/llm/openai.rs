//! Chat completions over an OpenAI-compatible API.

use super::{ChatModel, OutputFormat};
use crate::error::{FolioError, Result};
use crate::openai::OpenAIClient;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat model backed by the chat completions endpoint.
pub struct OpenAIChatModel {
    client: OpenAIClient,
    model: String,
    temperature: f32,
}

impl OpenAIChatModel {
    pub fn new(client: OpenAIClient, model: &str, temperature: f32) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature,
        }
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip(self, system, prompt), fields(model = %self.model))]
    async fn complete(
        &self,
        system: Option<&str>,
        prompt: &str,
        format: OutputFormat,
    ) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);

        if let Some(system) = system {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system.to_string())
                    .build()
                    .map_err(|e| FolioError::Llm(e.to_string()))?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| FolioError::Llm(e.to_string()))?
                .into(),
        );

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(messages)
            .temperature(self.temperature);
        if format == OutputFormat::Json {
            args.response_format(ResponseFormat::JsonObject);
        }
        let request = args.build().map_err(|e| FolioError::Llm(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| FolioError::Llm(format!("Chat completion failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| FolioError::Llm("Empty response from model".to_string()))?
            .clone();

        debug!("Model replied with {} characters", content.len());
        Ok(content)
    }
}
