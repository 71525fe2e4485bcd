//! Error types for the game engine.

use thiserror::Error;

use crate::role::ModelRole;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("OpenAI API error: {0}")]
    OpenAIError(#[from] async_openai::error::OpenAIError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream model error: {0}")]
    UpstreamError(String),

    #[error("Unknown provider '{provider}' configured for the {role} role")]
    UnknownProvider { role: ModelRole, provider: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid history: {0}")]
    InvalidHistory(String),
}

impl GameError {
    /// Whether the error was caused by the request payload rather than by
    /// the server or an upstream provider.
    pub fn is_client_error(&self) -> bool {
        matches!(self, GameError::InvalidHistory(_))
    }
}
