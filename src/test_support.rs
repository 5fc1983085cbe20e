//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::state::App;
use crate::inference::{
    CompletionProvider, CompletionRequest, NO_RESPONSE_PLACEHOLDER, ProviderError,
};

/// A provider for tests that never reach the network.
pub struct NoopProvider;

#[async_trait]
impl CompletionProvider for NoopProvider {
    fn name(&self) -> &str {
        "noop"
    }

    async fn complete(&self, _request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        Ok(NO_RESPONSE_PLACEHOLDER.to_string())
    }
}

enum Reply {
    Fixed(String),
    Echo,
}

/// Replies with canned text and records every prompt it receives.
pub struct StubProvider {
    reply: Reply,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Reply::Fixed(text.to_string()),
            calls: Arc::default(),
        }
    }

    /// Replies `echo: <prompt>`.
    pub fn echoing() -> Self {
        Self {
            reply: Reply::Echo,
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl CompletionProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.prompt.to_string());
        }
        Ok(match &self.reply {
            Reply::Fixed(text) => text.clone(),
            Reply::Echo => format!("echo: {}", request.prompt),
        })
    }
}

/// Always fails with a network error.
pub struct FailingProvider;

#[async_trait]
impl CompletionProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        Err(ProviderError::Network("connection refused".to_string()))
    }
}

/// Never answers.
pub struct HangingProvider;

#[async_trait]
impl CompletionProvider for HangingProvider {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn complete(&self, _request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        std::future::pending().await
    }
}

/// Creates a test App with a NoopProvider.
pub fn test_app() -> App {
    App::new(Arc::new(NoopProvider), "test-model".to_string())
}

pub fn app_with(provider: impl CompletionProvider + 'static) -> App {
    App::new(Arc::new(provider), "test-model".to_string())
}
