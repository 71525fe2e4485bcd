//! Dispatch of model calls to the provider configured for each role.

use std::collections::HashMap;
use std::sync::Arc;

use crate::anthropic::AnthropicProvider;
use crate::config::{Config, RolesConfig};
use crate::error::GameError;
use crate::mock::MockProvider;
use crate::openai::OpenAIProvider;
use crate::provider::{ChatMessage, CompletionRequest, LlmProvider};
use crate::role::ModelRole;

/// Routes `invoke(role, system, messages)` calls to registered providers.
#[derive(Debug, Clone)]
pub struct ModelRouter {
    roles: RolesConfig,
    providers: HashMap<String, Arc<dyn LlmProvider>>,
}

impl ModelRouter {
    /// Create a router with no providers registered.
    pub fn new(roles: RolesConfig) -> Self {
        Self {
            roles,
            providers: HashMap::new(),
        }
    }

    /// Build a router with the mock, OpenAI and Anthropic backends
    /// registered under their configuration names.
    pub fn from_config(config: &Config) -> Result<Self, GameError> {
        let providers = &config.providers;

        if providers.openai_api_key.is_none() && uses_provider(&config.roles, "openai") {
            tracing::warn!("OPENAI_API_KEY not set. OpenAI calls may fail.");
        }
        if providers.anthropic_api_key.is_none() && uses_provider(&config.roles, "anthropic") {
            tracing::warn!("ANTHROPIC_API_KEY not set. Anthropic calls may fail.");
        }

        let openai = OpenAIProvider::new(
            providers.openai_api_key.as_deref().unwrap_or_default(),
            &providers.openai_api_base,
        )?;
        let anthropic = AnthropicProvider::new(
            providers.anthropic_api_key.as_deref().unwrap_or_default(),
            &providers.anthropic_api_base,
        )?;

        Ok(Self::new(config.roles.clone())
            .with_provider(Arc::new(MockProvider::default()))
            .with_provider(Arc::new(openai))
            .with_provider(Arc::new(anthropic)))
    }

    /// Register a provider under its own name, replacing any previous one.
    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.providers.insert(provider.name().to_string(), provider);
        self
    }

    /// Call the model configured for `role` and return its text.
    pub async fn invoke(
        &self,
        role: ModelRole,
        system: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<String, GameError> {
        let settings = self.roles.get(role);
        let provider =
            self.providers
                .get(&settings.provider)
                .ok_or_else(|| GameError::UnknownProvider {
                    role,
                    provider: settings.provider.clone(),
                })?;

        tracing::debug!(
            role = %role,
            model = %settings.describe(),
            turns = messages.len(),
            "invoking model"
        );

        let request = CompletionRequest {
            model: settings.model.clone(),
            system: system.to_string(),
            messages,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        };

        provider.complete(request).await
    }
}

fn uses_provider(roles: &RolesConfig, name: &str) -> bool {
    ModelRole::all()
        .iter()
        .any(|role| roles.get(*role).provider == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::RoleSettings;

    fn roles(judge: &str, respondent: &str, verdict: &str) -> RolesConfig {
        RolesConfig {
            judge: RoleSettings::new(judge, "judge-model", 0.9),
            respondent: RoleSettings::new(respondent, "respondent-model", 1.0),
            verdict: RoleSettings::new(verdict, "verdict-model", 0.2),
        }
    }

    #[tokio::test]
    async fn test_invoke_uses_role_settings() {
        let judge = Arc::new(MockProvider::constant("from judge").named("judge-mock"));
        let other = Arc::new(MockProvider::constant("from other").named("other-mock"));
        let router = ModelRouter::new(roles("judge-mock", "other-mock", "other-mock"))
            .with_provider(judge.clone())
            .with_provider(other.clone());

        let reply = router
            .invoke(ModelRole::Judge, "sys", vec![ChatMessage::user("go")])
            .await
            .unwrap();
        assert_eq!(reply, "from judge");

        let seen = judge.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "judge-model");
        assert_eq!(seen[0].system, "sys");
        assert_eq!(seen[0].temperature, 0.9);
        assert!(other.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_provider_fails_at_call_time() {
        let router = ModelRouter::new(roles("mock", "nonexistent", "mock"))
            .with_provider(Arc::new(MockProvider::default()));

        assert!(
            router
                .invoke(ModelRole::Judge, "sys", vec![ChatMessage::user("go")])
                .await
                .is_ok()
        );

        let err = router
            .invoke(ModelRole::Respondent, "sys", vec![ChatMessage::user("go")])
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::UnknownProvider { .. }));
        assert!(err.to_string().contains("nonexistent"));
        assert!(err.to_string().contains("respondent"));
    }

    #[test]
    fn test_from_config_registers_builtin_providers() {
        let router = ModelRouter::from_config(&crate::config::default_config()).unwrap();
        for name in ["mock", "openai", "anthropic"] {
            assert!(router.providers.contains_key(name), "missing {name}");
        }
    }
}
