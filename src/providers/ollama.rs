use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{CompletionProvider, CompletionRequest, CompletionResponse, truncate_for_log};
use crate::errors::ProviderError;

/// Ollama client for interacting with a local Ollama server
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    pub eval_count: Option<u64>,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            options: None,
            stream: Some(false),
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }
}

impl Ollama {
    /// Default local server address
    pub const DEFAULT_URL: &'static str = "http://localhost:11434";

    /// Create a new Ollama client from a complete URL
    pub fn from_url(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let base_url = if url.trim().is_empty() {
            Self::DEFAULT_URL.to_string()
        } else {
            url.trim().trim_end_matches('/').to_string()
        };

        let parsed = Url::parse(&base_url).with_context(|| format!("Invalid Ollama URL: {}", base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("Ollama URL must use http or https: {}", base_url));
        }

        Ok(Self {
            base_url,
            client: Client::builder()
                .timeout(timeout)
                // Ollama speaks HTTP/1.1
                .http1_only()
                .build()
                .unwrap_or_default(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Parse a generate response, accepting a JSONL stream when the server ignores `stream: false`
    pub fn parse_generation(body: &str) -> Result<GenerationResponse, ProviderError> {
        if let Ok(response) = serde_json::from_str::<GenerationResponse>(body) {
            return Ok(response);
        }

        let chunks: Vec<GenerationResponse> = body
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str::<GenerationResponse>(line).ok())
            .collect();

        if chunks.is_empty() {
            error!("Failed to parse Ollama API response: {}", truncate_for_log(body));
            return Err(ProviderError::ParseError(
                "Failed to parse Ollama API response".to_string(),
            ));
        }

        warn!("Ollama returned a streamed response, joining {} chunks", chunks.len());
        let response = chunks.iter().map(|c| c.response.as_str()).collect::<String>();
        let last = chunks.iter().rev().find(|c| c.done).or(chunks.last());

        Ok(GenerationResponse {
            response,
            done: true,
            prompt_eval_count: last.and_then(|c| c.prompt_eval_count),
            eval_count: last.and_then(|c| c.eval_count),
        })
    }
}

#[async_trait]
impl CompletionProvider for Ollama {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        debug!("Ollama {} request to model {}", request.kind, request.model);

        let body = GenerationRequest::new(request.model, request.prompt).temperature(0.3);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to connect to Ollama at {}: {}", self.base_url, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read Ollama response: {}", e)))?;

        if !status.is_success() {
            error!("Ollama API error ({}): {}", status, truncate_for_log(&text));
            return Err(ProviderError::from_status(status.as_u16(), text));
        }

        let generated = Self::parse_generation(&text)?;
        Ok(CompletionResponse {
            text: generated.response,
            prompt_tokens: generated.prompt_eval_count,
            completion_tokens: generated.eval_count,
        })
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn requires_credential(&self) -> bool {
        false
    }
}
