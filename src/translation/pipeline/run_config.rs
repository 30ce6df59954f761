use std::fmt;

use crate::errors::ConfigurationError;
use crate::language_utils::resolve_language;
use crate::translation::segmenter::SegmentationStrategy;

/// Settings for one pipeline run. Built once, then read-only while the run lasts.
#[derive(Clone, PartialEq)]
pub struct RunConfiguration {
    /// Language of the document
    pub source_language: String,
    /// Language to translate into
    pub target_language: String,
    /// How the document is split
    pub strategy: SegmentationStrategy,
    /// Model used for the translate stage
    pub translation_model: String,
    /// Model used for back-translation and evaluation
    pub verification_model: String,
    /// Optional style or tone instructions
    pub custom_instructions: Option<String>,
    /// Whether the quality audit stage runs
    pub enable_evaluation: bool,
    /// Caller's own key; lifts the token ceiling
    pub credential: Option<String>,
}

impl RunConfiguration {
    /// Configuration with default strategy and no models set
    pub fn new(source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            source_language: source_language.into(),
            target_language: target_language.into(),
            strategy: SegmentationStrategy::default(),
            translation_model: String::new(),
            verification_model: String::new(),
            custom_instructions: None,
            enable_evaluation: false,
            credential: None,
        }
    }

    pub fn with_strategy(mut self, strategy: SegmentationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set both models
    pub fn with_models(mut self, translation: impl Into<String>, verification: impl Into<String>) -> Self {
        self.translation_model = translation.into();
        self.verification_model = verification.into();
        self
    }

    /// Blank instructions count as none
    pub fn with_custom_instructions(mut self, instructions: Option<&str>) -> Self {
        self.custom_instructions = instructions
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_evaluation(mut self, enabled: bool) -> Self {
        self.enable_evaluation = enabled;
        self
    }

    /// Blank credentials count as none
    pub fn with_credential(mut self, credential: Option<&str>) -> Self {
        self.credential = credential
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);
        self
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Check the settings and resolve both languages to their prompt names.
    ///
    /// Returns a copy with resolved languages; the original is left untouched.
    pub fn validated(&self) -> Result<Self, ConfigurationError> {
        let source_language = resolve_language("source", &self.source_language)?;
        let target_language = resolve_language("target", &self.target_language)?;

        if self.translation_model.trim().is_empty() {
            return Err(ConfigurationError::MissingModel("translation"));
        }
        if self.verification_model.trim().is_empty() {
            return Err(ConfigurationError::MissingModel("verification"));
        }

        Ok(Self {
            source_language,
            target_language,
            translation_model: self.translation_model.trim().to_string(),
            verification_model: self.verification_model.trim().to_string(),
            ..self.clone()
        })
    }
}

// Credentials never reach logs
impl fmt::Debug for RunConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfiguration")
            .field("source_language", &self.source_language)
            .field("target_language", &self.target_language)
            .field("strategy", &self.strategy)
            .field("translation_model", &self.translation_model)
            .field("verification_model", &self.verification_model)
            .field("custom_instructions", &self.custom_instructions)
            .field("enable_evaluation", &self.enable_evaluation)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
