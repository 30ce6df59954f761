//! Language utilities for run configuration
//!
//! Providers are prompted with plain English language names, so user input is
//! resolved to a name. Preset names match case-insensitively, ISO 639-1 and
//! ISO 639-2 codes are expanded, and anything else is taken as a custom name.

use anyhow::{Result, anyhow};
use isolang::Language;

use crate::errors::ConfigurationError;

/// Sentinel meaning "type your own language"
pub const CUSTOM_LANGUAGE: &str = "custom";

/// Placeholder shown before a language is picked
pub const LANGUAGE_PLACEHOLDER: &str = "choose a language";

/// Preset language names offered by default
pub const PRESET_LANGUAGES: &[&str] = &[
    "English",
    "Spanish",
    "French",
    "German",
    "Italian",
    "Portuguese",
    "Chinese (Simplified)",
    "Japanese",
    "Korean",
    "Russian",
    "Arabic",
    "Hindi",
    "Czech",
    "Polish",
];

/// Whether a value is a leftover selection rather than a language
pub fn is_placeholder(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    normalized.is_empty() || normalized == CUSTOM_LANGUAGE || normalized == LANGUAGE_PLACEHOLDER
}

/// Resolve user input into the language name used in prompts.
///
/// `role` is "source" or "target" and only feeds the error message.
pub fn resolve_language(role: &'static str, input: &str) -> Result<String, ConfigurationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ConfigurationError::MissingLanguage(role));
    }
    if is_placeholder(trimmed) {
        return Err(ConfigurationError::InvalidLanguage {
            role,
            value: trimmed.to_string(),
        });
    }

    if let Some(preset) = PRESET_LANGUAGES
        .iter()
        .find(|preset| preset.eq_ignore_ascii_case(trimmed))
    {
        return Ok((*preset).to_string());
    }

    if (2..=3).contains(&trimmed.len()) && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        if let Ok(name) = get_language_name(trimmed) {
            return Ok(name);
        }
    }

    Ok(trimmed.to_string())
}

/// Map an ISO 639-2/B code to its 639-2/T form when they differ
fn bibliographic_to_terminology(code: &str) -> Option<&'static str> {
    match code {
        "fre" => Some("fra"),
        "ger" => Some("deu"),
        "dut" => Some("nld"),
        "gre" => Some("ell"),
        "chi" => Some("zho"),
        "cze" => Some("ces"),
        "ice" => Some("isl"),
        "alb" => Some("sqi"),
        "arm" => Some("hye"),
        "baq" => Some("eus"),
        "bur" => Some("mya"),
        "per" => Some("fas"),
        "geo" => Some("kat"),
        "may" => Some("msa"),
        "mac" => Some("mkd"),
        "rum" => Some("ron"),
        "slo" => Some("slk"),
        "wel" => Some("cym"),
        _ => None,
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => {
            if let Some(lang) = Language::from_639_1(&normalized_code) {
                return Ok(lang.to_639_3().to_string());
            }
        }
        3 => {
            if Language::from_639_3(&normalized_code).is_some() {
                return Ok(normalized_code);
            }
            if let Some(part2t) = bibliographic_to_terminology(&normalized_code) {
                return Ok(part2t.to_string());
            }
        }
        _ => {}
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
