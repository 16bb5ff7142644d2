use std::fmt;

use async_trait::async_trait;

use super::types::Conversation;

/// Errors that can occur during provider operations.
/// Variants carry enough info to determine retryability (future use).
#[derive(Debug)]
pub enum ProviderError {
    /// Provider misconfigured (missing API key, bad URL). Not retryable.
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused). Retryable.
    Network(String),
    /// API returned an error response. Retryable if status >= 500 or 429.
    Api { status: u16, message: String },
    /// Failed to parse the provider's response. Not retryable.
    Parse(String),
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
        }
    }
}

impl std::error::Error for ProviderError {}

/// Everything a provider needs to fulfill a completion request.
pub struct CompletionRequest<'a> {
    pub conversation: &'a Conversation,
    pub model: &'a str,
    pub max_tokens: u32,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    /// Runs one completion over the full conversation and returns the
    /// reply text. Blocks (logically) until the remote call resolves.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError>;
}
