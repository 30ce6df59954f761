/*!
 * Tests for application configuration functionality
 */

use contextual_translator::app_config::{Config, LogLevel, ProviderConfig, TranslationProvider};
use contextual_translator::translation::SegmentationStrategy;
use std::str::FromStr;

use crate::common;

#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "English");
    assert_eq!(config.target_language, "Spanish");
    assert_eq!(config.translation.provider, TranslationProvider::Gemini);
    assert_eq!(config.translation.available_providers.len(), 4);
    assert_eq!(config.translation.common.retry_attempts, 3);
    assert_eq!(config.translation.common.retry_backoff_ms, 2000);
    assert_eq!(config.translation.common.token_ceiling, 100_000);
    assert_eq!(config.pipeline.segmentation, SegmentationStrategy::Paragraphs);
    assert!(!config.pipeline.enable_evaluation);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_validate_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.source_language = "  ".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    config.target_language = "Choose a language".to_string();
    assert!(config.validate().is_err());
    config.target_language = "Klingon".to_string();
    assert!(config.validate().is_ok(), "custom language names are accepted");

    config.translation.common.retry_attempts = 0;
    assert!(config.validate().is_err());
    config.translation.common.retry_attempts = 1;

    config.translation.common.token_ceiling = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withNonHttpEndpoint_shouldFail() {
    let mut config = Config::default();
    config.translation.active_provider_config_mut().endpoint = "ftp://example.com".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_activeProviderConfigMut_missingProvider_shouldBeCreated() {
    let mut config = Config::default();
    config.translation.available_providers.clear();
    config.translation.provider = TranslationProvider::Anthropic;

    config.translation.active_provider_config_mut().model = "claude-custom".to_string();

    assert_eq!(config.translation.available_providers.len(), 1);
    assert_eq!(config.translation.get_model(), "claude-custom");
    assert_eq!(config.translation.get_endpoint(), "https://api.anthropic.com");
}

#[test]
fn test_getVerificationModel_blank_shouldFallBackToTranslationModel() {
    let mut config = Config::default();
    let active = config.translation.active_provider_config_mut();
    active.model = "fast-model".to_string();
    active.verification_model = String::new();

    assert_eq!(config.translation.get_verification_model(), "fast-model");
}

#[test]
fn test_getTimeout_ollama_shouldAllowSlowerLocalModels() {
    let ollama = ProviderConfig::new(TranslationProvider::Ollama);
    let gemini = ProviderConfig::new(TranslationProvider::Gemini);
    assert_eq!(ollama.timeout_secs, 120);
    assert_eq!(gemini.timeout_secs, 60);
}

#[test]
fn test_translationProvider_fromStr_shouldBeCaseInsensitive() {
    assert_eq!(TranslationProvider::from_str("OpenAI").unwrap(), TranslationProvider::OpenAI);
    assert_eq!(TranslationProvider::from_str("gemini").unwrap(), TranslationProvider::Gemini);
    assert!(TranslationProvider::from_str("lmstudio").is_err());
    assert_eq!(TranslationProvider::Ollama.api_key_env_var(), None);
    assert_eq!(TranslationProvider::Anthropic.api_key_env_var(), Some("ANTHROPIC_API_KEY"));
}

#[test]
fn test_loadOrCreate_missingFile_shouldWriteDefaultConfig() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("conf.json");

    let created = Config::load_or_create(&path).unwrap();
    assert!(path.exists());

    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.target_language, created.target_language);
    assert_eq!(reloaded.translation.get_model(), created.translation.get_model());
}

#[test]
fn test_loadOrCreate_invalidJson_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_runConfiguration_blankCredential_shouldBeDropped() {
    let config = Config::default();
    let run = config.run_configuration(Some("   "));
    assert!(!run.has_credential());
    assert_eq!(run.translation_model, "gemini-3-flash-preview");
}
