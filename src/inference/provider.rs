use std::fmt;

use async_trait::async_trait;

/// Errors that can occur during provider operations.
///
/// The turn controller collapses every variant into the same error entry;
/// the variants exist for logging.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Provider misconfigured (missing API key, bad URL).
    Config(String),
    /// Network-level failure (DNS, connection refused, reset).
    Network(String),
    /// API returned a non-2xx response.
    Api { status: u16, message: String },
    /// Response body was not the JSON shape we expect.
    Parse(String),
    /// No response within the configured window.
    Timeout { secs: u64 },
    /// The request task ended without reporting (panicked or was aborted).
    Internal(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
            ProviderError::Timeout { secs } => write!(f, "no response after {secs}s"),
            ProviderError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Everything a provider needs to fulfill a single completion.
///
/// Only the latest prompt travels; earlier turns are never sent.
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    pub model: &'a str,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Sends the prompt and returns the first candidate's text.
    ///
    /// A well-formed response without any candidate text resolves to
    /// [`NO_RESPONSE_PLACEHOLDER`](super::NO_RESPONSE_PLACEHOLDER), not an error.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError>;
}
