//! Deterministic provider for tests and offline play.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::GameError;
use crate::provider::{CompletionRequest, LlmProvider};

/// Reply returned by [`MockProvider::default`].
pub const MOCK_RESPONSE: &str = "This is a mock LLM response.";

/// A provider that returns canned replies without any network access.
///
/// Replies are cycled in order. Every request is recorded so tests can
/// inspect exactly what was sent.
#[derive(Debug)]
pub struct MockProvider {
    name: String,
    responses: Vec<String>,
    index: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    /// Create a mock that cycles through the given replies.
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            name: "mock".to_string(),
            responses,
            index: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the same reply.
    pub fn constant(response: &str) -> Self {
        Self::new(vec![response.to_string()])
    }

    /// Rename the mock so several can be registered side by side.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::constant(MOCK_RESPONSE)
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, GameError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);

        if self.responses.is_empty() {
            return Ok(MOCK_RESPONSE.to_string());
        }

        let idx = self.index.fetch_add(1, Ordering::Relaxed);
        Ok(self.responses[idx % self.responses.len()].clone())
    }
}
