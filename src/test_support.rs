//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::path::PathBuf;

use async_trait::async_trait;
use log::LevelFilter;

use crate::core::config::ResolvedConfig;
use crate::inference::{CompletionProvider, CompletionRequest, ProviderError};

/// A provider that always answers with the same canned reply.
pub struct CannedProvider(pub &'static str);

#[async_trait]
impl CompletionProvider for CannedProvider {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, _request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        Ok(self.0.to_string())
    }
}

/// A provider that always fails with a network error.
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

/// A ResolvedConfig with test-friendly values.
pub fn test_config() -> ResolvedConfig {
    ResolvedConfig {
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        max_tokens: 150,
        history_file: PathBuf::from("test-history"),
        base_url: "http://localhost:0/v1".to_string(),
        system_prompt: "You are a helpful assistant.".to_string(),
        log_level: LevelFilter::Warn,
    }
}
