//! Anthropic Messages API backend.
//!
//! Unlike the OpenAI backend, system instructions are a top-level request
//! field and the API only accepts temperatures up to 1.0.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::GameError;
use crate::provider::{ChatMessage, CompletionRequest, LlmProvider};

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const MAX_TEMPERATURE: f32 = 1.0;

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Provider backed by the Anthropic Messages API.
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, GameError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GameError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

/// Clamp a requested temperature into the range the API accepts.
pub fn clamp_temperature(requested: f32) -> f32 {
    requested.clamp(0.0, MAX_TEMPERATURE)
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, GameError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &request.model,
            system: &request.system,
            messages: &request.messages,
            temperature: clamp_temperature(request.temperature),
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GameError::UpstreamError(format!(
                "Anthropic returned {}: {}",
                status, body
            )));
        }

        let parsed: MessagesResponse = response.json().await?;
        Ok(collect_text(&parsed))
    }
}

fn collect_text(response: &MessagesResponse) -> String {
    response
        .content
        .iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text.as_deref())
        .collect::<Vec<_>>()
        .join("")
}
