use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::language_utils::resolve_language;
use crate::translation::pipeline::RunConfiguration;
use crate::translation::retry::RetryPolicy;
use crate::translation::segmenter::SegmentationStrategy;

/// Application configuration module
///
/// Loads, validates and saves `conf.json`, and turns it into the immutable
/// `RunConfiguration` a pipeline run consumes.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language (preset name, ISO code or custom name)
    pub source_language: String,

    /// Target language (preset name, ISO code or custom name)
    pub target_language: String,

    /// Translation config
    pub translation: TranslationConfig,

    /// Pipeline behaviour
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: OpenAI or any OpenAI-compatible server
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: Ollama (local, no key)
    Ollama,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }

    // @returns: Environment variable holding the shared key, if the provider uses one
    pub fn api_key_env_var(&self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Ollama => None,
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Translation model
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Back-translation and evaluation model (defaults to `model`)
    #[serde(default = "String::new")]
    pub verification_model: String,

    // @field: Shared API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(provider_type),
            verification_model: default_model(provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(provider_type),
            timeout_secs: match provider_type {
                TranslationProvider::Ollama => default_ollama_timeout_secs(),
                _ => default_timeout_secs(),
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Total attempts per request when the provider throttles
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Wait before the first retry in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Projected token ceiling for runs without a caller-supplied key
    #[serde(default = "default_token_ceiling")]
    pub token_ceiling: usize,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            token_ceiling: default_token_ceiling(),
        }
    }
}

/// Pipeline behaviour settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PipelineSettings {
    /// How documents are split
    #[serde(default)]
    pub segmentation: SegmentationStrategy,

    /// Style or tone instructions added to every translate prompt
    #[serde(default)]
    pub custom_instructions: Option<String>,

    /// Whether the quality audit stage runs
    #[serde(default)]
    pub enable_evaluation: bool,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_ollama_timeout_secs() -> u64 {
    120
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    2000 // doubled on each retry: 2s, 4s
}

fn default_token_ceiling() -> usize {
    100_000
}

fn default_model(provider: TranslationProvider) -> String {
    match provider {
        TranslationProvider::Gemini => "gemini-3-flash-preview",
        TranslationProvider::OpenAI => "gpt-4o-mini",
        TranslationProvider::Anthropic => "claude-3-5-haiku-latest",
        TranslationProvider::Ollama => "llama3.2:3b",
    }
    .to_string()
}

fn default_endpoint(provider: TranslationProvider) -> String {
    match provider {
        TranslationProvider::Gemini => "https://generativelanguage.googleapis.com",
        TranslationProvider::OpenAI => "https://api.openai.com/v1",
        TranslationProvider::Anthropic => "https://api.anthropic.com",
        TranslationProvider::Ollama => "http://localhost:11434",
    }
    .to_string()
}

impl Config {
    /// Load the configuration at `path`, writing a default one first if it is missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            return serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()));
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        resolve_language("source", &self.source_language)?;
        resolve_language("target", &self.target_language)?;

        if self.translation.get_model().trim().is_empty() {
            return Err(anyhow!("No model configured for provider {}", self.translation.provider));
        }

        let endpoint = self.translation.get_endpoint();
        let url = Url::parse(&endpoint).with_context(|| format!("Invalid endpoint URL: {}", endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!("Endpoint must use http or https: {}", endpoint));
        }

        if self.translation.common.retry_attempts == 0 {
            return Err(anyhow!("retry_attempts must be at least 1"));
        }
        if self.translation.common.token_ceiling == 0 {
            return Err(anyhow!("token_ceiling must be greater than 0"));
        }

        Ok(())
    }

    /// Build the settings for one run. Languages are resolved later, at run start.
    pub fn run_configuration(&self, credential: Option<&str>) -> RunConfiguration {
        RunConfiguration::new(&self.source_language, &self.target_language)
            .with_strategy(self.pipeline.segmentation)
            .with_models(self.translation.get_model(), self.translation.get_verification_model())
            .with_custom_instructions(self.pipeline.custom_instructions.as_deref())
            .with_evaluation(self.pipeline.enable_evaluation)
            .with_credential(credential)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "English".to_string(),
            target_language: "Spanish".to_string(),
            translation: TranslationConfig::default(),
            pipeline: PipelineSettings::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Mutable access to the active provider configuration, created with defaults if absent
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        if let Some(index) = self
            .available_providers
            .iter()
            .position(|p| p.provider_type == provider_str)
        {
            return &mut self.available_providers[index];
        }
        self.available_providers.push(ProviderConfig::new(self.provider));
        let last = self.available_providers.len() - 1;
        &mut self.available_providers[last]
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the translation model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        default_model(self.provider)
    }

    /// Get the verification model, falling back to the translation model
    pub fn get_verification_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.verification_model.is_empty() {
                return provider_config.verification_model.clone();
            }
        }

        self.get_model()
    }

    /// Get the shared API key: the configured one, else the provider's environment variable
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        self.provider
            .api_key_env_var()
            .and_then(|name| std::env::var(name).ok())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        default_endpoint(self.provider)
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout(&self) -> Duration {
        let secs = self
            .get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs);
        Duration::from_secs(secs)
    }

    /// Retry settings for throttled requests
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.common.retry_attempts, self.common.retry_backoff_ms)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Gemini),
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
