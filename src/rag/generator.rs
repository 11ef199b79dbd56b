//! Text-generation providers.

use super::{ChatRole, ChatTurn};
use crate::config::RagSettings;
use crate::error::{GanjError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Trait for chat completion providers.
#[async_trait]
pub trait ChatGenerator: Send + Sync {
    /// Produce one completion for a system prompt followed by conversation turns.
    async fn generate(&self, system_prompt: &str, turns: &[ChatTurn]) -> Result<String>;
}

/// OpenAI chat completion provider.
pub struct OpenAIChatGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAIChatGenerator {
    /// Create a generator from RAG settings.
    pub fn new(settings: &RagSettings) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    /// Override the model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    fn build_messages(
        system_prompt: &str,
        turns: &[ChatTurn],
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| GanjError::Rag(e.to_string()))?
                .into(),
        ];

        for turn in turns {
            let message: ChatCompletionRequestMessage = match turn.role {
                ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| GanjError::Rag(e.to_string()))?
                    .into(),
                ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| GanjError::Rag(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

        Ok(messages)
    }
}

#[async_trait]
impl ChatGenerator for OpenAIChatGenerator {
    #[instrument(skip(self, system_prompt, turns), fields(model = %self.model, turns = turns.len()))]
    async fn generate(&self, system_prompt: &str, turns: &[ChatTurn]) -> Result<String> {
        let messages = Self::build_messages(system_prompt, turns)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .build()
            .map_err(|e| GanjError::Rag(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| GanjError::OpenAI(format!("Failed to generate response: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        debug!("Generated {} characters", answer.chars().count());
        Ok(answer)
    }
}
