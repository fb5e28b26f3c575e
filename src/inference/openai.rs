//! OpenAI chat-completions implementation of [`ChatModel`].

use super::ChatModel;
use crate::error::{GjestError, Result};
use crate::openai::create_client;
use crate::retry::RetryPolicy;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::debug;

/// Chat model backed by the OpenAI chat completions API.
pub struct OpenAiChat {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    retry: RetryPolicy,
}

impl OpenAiChat {
    pub fn new(model: &str, retry: RetryPolicy) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
            retry,
        }
    }

    async fn complete_once(&self, system: &str, user: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| GjestError::Inference(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| GjestError::Inference(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.0)
            .build()
            .map_err(|e| GjestError::Inference(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| GjestError::OpenAI(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| GjestError::Inference("Empty response from model".to_string()))?;

        debug!("Model response: {} bytes", content.len());
        Ok(content.clone())
    }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.retry
            .run("chat_completion", || self.complete_once(system, user))
            .await
    }
}
