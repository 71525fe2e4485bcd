//! Model roles and their per-role settings.
//!
//! Every model call in a game is made on behalf of one role. The role picks
//! which provider, model and sampling temperature are used.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The part a language model plays in a game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModelRole {
    /// Asks the interview questions.
    Judge,
    /// Answers questions while standing in for the second party.
    Respondent,
    /// Reads both transcripts and decides which one is human.
    Verdict,
}

impl ModelRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelRole::Judge => "judge",
            ModelRole::Respondent => "respondent",
            ModelRole::Verdict => "verdict",
        }
    }

    /// Prefix of the environment variables that configure this role,
    /// e.g. `JUDGE_MODEL`.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            ModelRole::Judge => "JUDGE",
            ModelRole::Respondent => "RESPONDENT",
            ModelRole::Verdict => "VERDICT",
        }
    }

    pub fn all() -> [ModelRole; 3] {
        [ModelRole::Judge, ModelRole::Respondent, ModelRole::Verdict]
    }
}

impl fmt::Display for ModelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Provider, model and sampling settings for one role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleSettings {
    /// Registered provider name (e.g. "openai", "anthropic", "mock").
    pub provider: String,
    /// The model to request from the provider.
    pub model: String,
    /// Requested sampling temperature. Providers may clamp it.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

impl RoleSettings {
    pub fn new(provider: impl Into<String>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            temperature,
            max_tokens: 512,
        }
    }

    /// Set the token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Short description used in logs, e.g. `openai/gpt-4o`.
    pub fn describe(&self) -> String {
        format!("{}/{}", self.provider, self.model)
    }
}
