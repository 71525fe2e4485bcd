//! OpenAI chat-completions backend.
//!
//! System instructions travel as the first `system` message and the
//! requested temperature is forwarded untouched.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;

use crate::error::GameError;
use crate::provider::{ChatMessage, ChatRole, CompletionRequest, LlmProvider};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Provider backed by any OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    client: Client<OpenAIConfig>,
}

impl OpenAIProvider {
    pub fn new(api_key: &str, api_base: &str) -> Result<Self, GameError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GameError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        Ok(Self {
            client: Client::with_config(config).with_http_client(http_client),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, GameError> {
        let messages = to_openai_messages(&request.system, &request.messages);

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&request.model)
            .max_completion_tokens(request.max_tokens)
            .temperature(request.temperature)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(chat_request).await?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| GameError::UpstreamError("OpenAI returned no message content".to_string()))
    }
}

fn to_openai_messages(system: &str, messages: &[ChatMessage]) -> Vec<ChatCompletionRequestMessage> {
    let mut out = Vec::with_capacity(messages.len() + 1);
    out.push(ChatCompletionRequestMessage::System(
        ChatCompletionRequestSystemMessage {
            content: system.to_string().into(),
            name: None,
        },
    ));

    for message in messages {
        let converted = match message.role {
            ChatRole::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: message.content.clone().into(),
                name: None,
            }),
            ChatRole::Assistant => {
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content: Some(message.content.clone().into()),
                    name: None,
                    tool_calls: None,
                    refusal: None,
                    audio: None,
                    function_call: None,
                })
            }
        };
        out.push(converted);
    }

    out
}
