//! OpenAI-compatible provider using the Chat Completions API.
//!
//! Works against api.openai.com and any gateway that speaks the same
//! `/chat/completions` contract. Non-streaming: one request, one JSON
//! body, one reply string.

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::inference::{CompletionProvider, CompletionRequest, Message, ProviderError};

// ============================================================================
// Chat Completions API Types
// ============================================================================

/// The request body for the Chat Completions API.
#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
}

/// The response body: one reply per choice, first choice wins.
#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize, Debug)]
struct ReplyMessage {
    content: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Provider for OpenAI-compatible chat completion endpoints.
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new provider.
    ///
    /// # Arguments
    /// * `api_key` - Bearer credential sent with every request
    /// * `base_url` - Optional custom base URL (defaults to OpenAI's API)
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            client: reqwest::Client::new(),
        }
    }

    /// Sends a request to the completions endpoint and returns the response.
    async fn send_request(
        &self,
        request: &ChatRequest<'_>,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("chat completion response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("chat completion API error: {} - {}", status, err_body);
            return Err(ProviderError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::Config("API key is empty".to_string()));
        }

        let chat_request = ChatRequest {
            model: request.model,
            messages: request.conversation.messages(),
            max_tokens: request.max_tokens,
        };

        info!(
            "chat completion request: model={}, messages={}, max_tokens={}",
            chat_request.model,
            chat_request.messages.len(),
            chat_request.max_tokens,
        );

        let response = self.send_request(&chat_request).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Parse("response contained no choices".to_string()))?
            .message
            .content;

        debug!("reply received: {} bytes", reply.len());
        Ok(reply)
    }
}
