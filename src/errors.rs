/*!
 * Error types for the contextual-translator application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions. The taxonomy follows
 * how far a failure is allowed to travel:
 * - `ConfigurationError` stops a run before it starts
 * - `ProviderError` is a single failed request, possibly transient
 * - `TranslationError` is a failed pipeline stage for one segment
 * - `AppError` wraps everything for the command line
 */

use std::fmt;

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether the provider signalled throttling (429, resource exhausted or quota).
    ///
    /// Only these failures are worth waiting out; everything else is fatal.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code: 429, .. } => true,
            Self::ApiError { message, .. }
            | Self::RequestFailed(message)
            | Self::ConnectionError(message) => message_signals_rate_limit(message),
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }

    /// Map an HTTP status and error body into the matching variant
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            429 => Self::RateLimitExceeded(message),
            401 | 403 => Self::AuthenticationError(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

fn message_signals_rate_limit(message: &str) -> bool {
    let lowered = message.to_lowercase();
    lowered.contains("429")
        || lowered.contains("resource_exhausted")
        || lowered.contains("resource exhausted")
        || lowered.contains("quota")
}

/// The pipeline stage a provider call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Primary translation of a segment
    Translate,
    /// Literal translation back into the source language
    BackTranslate,
    /// Optional quality audit
    Evaluate,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translate => write!(f, "translate"),
            Self::BackTranslate => write!(f, "back-translate"),
            Self::Evaluate => write!(f, "evaluate"),
        }
    }
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Non-retryable error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The provider kept throttling until the attempt budget ran out
    #[error("Rate limited after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// The error of the final attempt
        last: ProviderError,
    },

    /// A pipeline stage failed
    #[error("Failed to {stage} segment: {source}")]
    Stage {
        /// Stage that failed
        stage: PipelineStage,
        /// Underlying failure
        #[source]
        source: Box<TranslationError>,
    },
}

impl TranslationError {
    /// Attach the pipeline stage to a failure
    pub fn in_stage(self, stage: PipelineStage) -> Self {
        Self::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// The stage this failure happened in, if known
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Errors that prevent a run from starting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Nothing to translate
    #[error("The document is empty")]
    EmptyDocument,

    /// A language was left blank
    #[error("The {0} language is missing")]
    MissingLanguage(&'static str),

    /// A language is still the placeholder selection
    #[error("Invalid {role} language selection: '{value}'")]
    InvalidLanguage {
        /// "source" or "target"
        role: &'static str,
        /// The rejected value
        value: String,
    },

    /// A model identifier was left blank
    #[error("The {0} model is missing")]
    MissingModel(&'static str),

    /// The provider needs a key and none was supplied
    #[error("API key is missing for provider {0}. Configure one or pass a credential")]
    MissingCredential(String),

    /// The projected cost is over the free ceiling
    #[error(
        "Estimated {estimated} tokens exceeds the limit of {ceiling} tokens. Provide your own API key to remove the limit"
    )]
    QuotaExceeded {
        /// Projected contextual token count
        estimated: usize,
        /// Ceiling in force
        ceiling: usize,
    },

    /// Any other invalid setting
    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// Setting name
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Errors raised by the pipeline orchestrator itself
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The run was refused before any request was issued
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A segment was asked to move backwards or skip a stage
    #[error("Segment {ordinal} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Ordinal of the segment
        ordinal: usize,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigurationError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Error while serializing results
    #[error("Export error: {0}")]
    Export(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Export(error.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(error: csv::Error) -> Self {
        Self::Export(error.to_string())
    }
}
