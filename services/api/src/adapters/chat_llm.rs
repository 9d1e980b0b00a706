//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the chat model.
//! It implements the `ChatModelService` port from the `core` crate against any
//! OpenAI-compatible chat-completions endpoint (Gemini by default).

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use course_assistant_core::{
    domain::ChatTurn,
    ports::{ChatModelService, PortError, PortResult},
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChatModelService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    fn user_message(content: &str) -> PortResult<ChatCompletionRequestMessage> {
        Ok(ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into())
    }

    fn assistant_message(content: &str) -> PortResult<ChatCompletionRequestMessage> {
        Ok(ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into())
    }
}

//=========================================================================================
// `ChatModelService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatModelService for OpenAiChatAdapter {
    /// Replays the conversation so far and asks for a reply to `prompt`.
    async fn complete(&self, history: &[ChatTurn], prompt: &str) -> PortResult<String> {
        let mut messages = Vec::with_capacity(history.len() * 2 + 1);
        for turn in history {
            messages.push(Self::user_message(&turn.user_message)?);
            messages.push(Self::assistant_message(&turn.bot_response)?);
        }
        messages.push(Self::user_message(prompt)?);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and map the error here, since the orphan rule forbids a From impl.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                PortError::Unexpected("Chat model returned no text content.".to_string())
            })
    }
}
