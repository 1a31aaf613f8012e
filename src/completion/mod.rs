//! Completion client abstraction.
//!
//! The pipeline talks to the language model only through [`CompletionClient`],
//! so the provider can be swapped (or mocked in tests) without touching the
//! stage logic.

pub mod message;
pub mod openai;

pub use message::{ChatMessage, ChatMessageRole};
pub use openai::OpenAiClient;

use crate::error::UpstreamError;
use async_trait::async_trait;

/// A single chat-completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction framing the call.
    pub system: String,
    /// Conversation after the system instruction, oldest first.
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    /// A request made of one system instruction and one user message.
    pub fn new(
        system: impl Into<String>,
        user_content: impl Into<String>,
        max_tokens: u32,
        temperature: f32,
    ) -> Self {
        Self {
            system: system.into(),
            messages: vec![ChatMessage::user(user_content.into())],
            max_tokens,
            temperature,
        }
    }

    /// Content of the last user message, if any.
    pub fn user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role() == ChatMessageRole::User)
            .map(ChatMessage::content)
    }

    /// Full message list with the system instruction first.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.push(ChatMessage::system(&self.system));
        messages.extend(self.messages.iter().cloned());
        messages
    }
}

/// Anything that can turn a [`CompletionRequest`] into generated text.
///
/// One call is one attempt; implementations do not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, UpstreamError>;
}
