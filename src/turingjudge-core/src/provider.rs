//! Language model provider trait and common request types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Speaker of a conversational turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of a conversation sent to a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A fully resolved request for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model name as understood by the provider.
    pub model: String,
    /// System instructions.
    pub system: String,
    /// Conversation turns, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Requested sampling temperature.
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

/// A hosted (or mocked) chat model backend.
#[async_trait]
pub trait LlmProvider: Send + Sync + std::fmt::Debug {
    /// Provider name used in configuration.
    fn name(&self) -> &str;

    /// Generate a completion and return its text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, GameError>;
}
