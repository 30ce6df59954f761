use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, CompletionRequest, CompletionResponse, effective_key, truncate_for_log};
use crate::errors::ProviderError;

/// Gemini client for the Generative Language API
#[derive(Debug)]
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// Shared API key, used when a request brings no credential
    api_key: String,
    /// API base URL
    endpoint: String,
}

/// generateContent request body
#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    /// Conversation contents
    contents: Vec<GeminiContent>,
}

/// A content block made of parts
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    /// Role of the author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text parts
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A single text part
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    /// Text of the part
    #[serde(default)]
    pub text: String,
}

/// generateContent response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    /// Generated candidates
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    /// Token usage
    pub usage_metadata: Option<GeminiUsage>,
}

/// One generated candidate
#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    /// Candidate content
    pub content: Option<GeminiContent>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsage {
    /// Prompt token count
    pub prompt_token_count: Option<u64>,
    /// Generated token count
    pub candidates_token_count: Option<u64>,
}

impl GeminiRequest {
    /// Single-turn request holding one user prompt
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: prompt.into() }],
            }],
        }
    }
}

impl Gemini {
    /// Default public endpoint
    pub const DEFAULT_ENDPOINT: &'static str = "https://generativelanguage.googleapis.com";

    /// Create a new Gemini client
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

    fn url_for(&self, model: &str) -> String {
        let base = if self.endpoint.is_empty() {
            Self::DEFAULT_ENDPOINT
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/v1beta/models/{}:generateContent", base, model)
    }

    /// Extract the text of the first candidate
    pub fn extract_text_from_response(response: &GeminiResponse) -> String {
        response
            .candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.iter().map(|part| part.text.as_str()).collect::<String>())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for Gemini {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let key = effective_key(&self.api_key, &request)
            .map(str::to_owned)
            .ok_or_else(|| ProviderError::AuthenticationError("No Gemini API key configured".to_string()))?;

        debug!("Gemini {} request to model {}", request.kind, request.model);

        let response = self
            .client
            .post(self.url_for(&request.model))
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", key)
            .json(&GeminiRequest::from_prompt(request.prompt))
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to send request to Gemini API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Gemini API error ({}): {}", status, truncate_for_log(&error_text));
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        let gemini_response = response
            .json::<GeminiResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Gemini API response: {}", e)))?;

        Ok(CompletionResponse {
            text: Self::extract_text_from_response(&gemini_response),
            prompt_tokens: gemini_response.usage_metadata.as_ref().and_then(|u| u.prompt_token_count),
            completion_tokens: gemini_response.usage_metadata.as_ref().and_then(|u| u.candidates_token_count),
        })
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn has_configured_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
