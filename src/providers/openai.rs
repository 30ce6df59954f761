use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, CompletionRequest, CompletionResponse, effective_key, truncate_for_log};
use crate::errors::ProviderError;

/// OpenAI client, also usable with OpenAI-compatible servers
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base URL including the version segment, e.g. `https://api.openai.com/v1`
    endpoint: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,
    /// Conversation messages
    messages: Vec<OpenAIMessage>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat message
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the author
    pub role: String,
    /// Message text
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    /// Generated choices
    #[serde(default)]
    pub choices: Vec<OpenAIChoice>,
    /// Token usage
    pub usage: Option<OpenAIUsage>,
}

/// A generated choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    /// The generated message
    pub message: OpenAIMessage,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    /// Prompt tokens
    pub prompt_tokens: u64,
    /// Completion tokens
    pub completion_tokens: u64,
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.openai.com/v1/chat/completions".to_string()
        } else {
            format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
        }
    }

    /// Extract the first choice's text
    pub fn extract_text_from_response(response: &OpenAIResponse) -> String {
        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for OpenAI {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let key = effective_key(&self.api_key, &request)
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::AuthenticationError("No OpenAI API key configured".to_string()))?;

        debug!("OpenAI {} request to model {}", request.kind, request.model);

        let body = OpenAIRequest {
            model: request.model,
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: Some(request.prompt),
            }],
            temperature: Some(0.3),
        };

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to send request to OpenAI API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI API error ({}): {}", status, truncate_for_log(&error_text));
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let openai_response = response
            .json::<OpenAIResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI API response: {}", e)))?;

        Ok(CompletionResponse {
            text: Self::extract_text_from_response(&openai_response),
            prompt_tokens: openai_response.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: openai_response.usage.as_ref().map(|u| u.completion_tokens),
        })
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn has_configured_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
