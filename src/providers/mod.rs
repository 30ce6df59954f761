/*!
 * Provider implementations for text-completion services.
 *
 * This module contains client implementations for various LLM providers:
 * - Gemini: Google Generative Language API (default)
 * - OpenAI: OpenAI API and compatible servers
 * - Anthropic: Anthropic messages API
 * - Ollama: Local LLM server
 * - Mock: scripted provider for tests
 *
 * The pipeline treats every provider as one opaque call: a prompt goes in, text
 * or a classified `ProviderError` comes out.
 */

use std::fmt::{self, Debug};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod gemini;
pub mod mock;
pub mod ollama;
pub mod openai;

/// What a completion request is for. Informational for transports; used by
/// logging and by scripted providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Context-aware translation of a segment
    Translate,
    /// Literal back-translation for verification
    BackTranslate,
    /// Quality audit
    Evaluate,
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translate => write!(f, "translate"),
            Self::BackTranslate => write!(f, "back-translate"),
            Self::Evaluate => write!(f, "evaluate"),
        }
    }
}

/// A single completion request
#[derive(Clone)]
pub struct CompletionRequest {
    /// Kind of call
    pub kind: PromptKind,
    /// Model identifier
    pub model: String,
    /// Full prompt text
    pub prompt: String,
    /// Caller-supplied key, overrides the client's configured key
    pub credential: Option<String>,
}

impl CompletionRequest {
    /// Create a new request without a credential
    pub fn new(kind: PromptKind, model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            model: model.into(),
            prompt: prompt.into(),
            credential: None,
        }
    }

    /// Attach a credential
    pub fn with_credential(mut self, credential: Option<&str>) -> Self {
        self.credential = credential.map(str::to_string);
        self
    }
}

// Keep keys out of logs
impl Debug for CompletionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("prompt_chars", &self.prompt.chars().count())
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A completed request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Generated text
    pub text: String,
    /// Prompt tokens reported by the provider
    pub prompt_tokens: Option<u64>,
    /// Completion tokens reported by the provider
    pub completion_tokens: Option<u64>,
}

impl CompletionResponse {
    /// Response carrying only text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            prompt_tokens: None,
            completion_tokens: None,
        }
    }
}

/// Common trait for all completion providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation service.
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<CompletionResponse, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError>;

    /// Provider name for logs and messages
    fn name(&self) -> &str;

    /// Whether the provider needs an API key to serve requests
    fn requires_credential(&self) -> bool {
        true
    }

    /// Whether the client was configured with its own key
    fn has_configured_key(&self) -> bool {
        false
    }
}

/// Pick the key for a request: the caller's credential wins over the configured one.
pub(crate) fn effective_key<'a>(configured: &'a str, request: &'a CompletionRequest) -> Option<&'a str> {
    request
        .credential
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .or_else(|| Some(configured).filter(|key| !key.trim().is_empty()))
}

/// Truncate error bodies before they end up in messages
pub(crate) fn truncate_for_log(text: &str) -> String {
    const LIMIT: usize = 500;
    if text.chars().count() > LIMIT {
        format!("{}...", text.chars().take(LIMIT).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Build the provider selected in the configuration
pub fn build_provider(config: &TranslationConfig) -> Result<Arc<dyn CompletionProvider>> {
    let api_key = config.get_api_key();
    let endpoint = config.get_endpoint();
    let timeout = config.get_timeout();

    let provider: Arc<dyn CompletionProvider> = match config.provider {
        TranslationProvider::Gemini => Arc::new(gemini::Gemini::new(api_key, endpoint, timeout)),
        TranslationProvider::OpenAI => Arc::new(openai::OpenAI::new(api_key, endpoint, timeout)),
        TranslationProvider::Anthropic => {
            Arc::new(anthropic::Anthropic::new(api_key, endpoint, timeout))
        }
        TranslationProvider::Ollama => Arc::new(ollama::Ollama::from_url(endpoint, timeout)?),
    };

    Ok(provider)
}
