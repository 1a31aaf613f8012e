//! Chat message types sent to the completion provider.
//!
//! Serializes to the OpenAI-style `{"role": ..., "content": ...}` shape, so a
//! `Vec<ChatMessage>` can be placed directly into a request body.

use serde::{Deserialize, Serialize};

/// Role of a participant in a chat conversation.
///
/// Serializes to lowercase strings as expected by OpenAI-compatible APIs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageRole {
    /// Instruction that frames the whole exchange.
    System,
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: ChatMessageRole,
    content: String,
}

impl ChatMessage {
    pub fn system<S: ToString>(content: S) -> ChatMessage {
        ChatMessage {
            role: ChatMessageRole::System,
            content: content.to_string(),
        }
    }

    pub fn user<S: ToString>(content: S) -> ChatMessage {
        ChatMessage {
            role: ChatMessageRole::User,
            content: content.to_string(),
        }
    }

    pub fn assistant<S: ToString>(content: S) -> ChatMessage {
        ChatMessage {
            role: ChatMessageRole::Assistant,
            content: content.to_string(),
        }
    }

    /// Get the content of the message.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the role of the message.
    pub fn role(&self) -> ChatMessageRole {
        self.role
    }
}
