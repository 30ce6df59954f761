/*!
 * Tests for language resolution
 */

use contextual_translator::errors::ConfigurationError;
use contextual_translator::language_utils::{PRESET_LANGUAGES, is_placeholder, resolve_language};
use contextual_translator::{get_language_name, normalize_to_part2t};

#[test]
fn test_resolveLanguage_presetName_shouldMatchIgnoringCase() {
    assert_eq!(resolve_language("target", "french").unwrap(), "French");
    assert_eq!(resolve_language("target", " chinese (simplified) ").unwrap(), "Chinese (Simplified)");
}

#[test]
fn test_resolveLanguage_isoCodes_shouldExpandToNames() {
    assert_eq!(resolve_language("source", "en").unwrap(), "English");
    assert_eq!(resolve_language("source", "deu").unwrap(), "German");
    assert_eq!(resolve_language("source", "fre").unwrap(), "French");
}

#[test]
fn test_resolveLanguage_customName_shouldBeKeptVerbatim() {
    assert_eq!(resolve_language("target", "Old Norse").unwrap(), "Old Norse");
    assert_eq!(resolve_language("target", "Elvish").unwrap(), "Elvish");
}

#[test]
fn test_resolveLanguage_placeholders_shouldBeRejected() {
    assert_eq!(
        resolve_language("source", ""),
        Err(ConfigurationError::MissingLanguage("source"))
    );
    assert!(matches!(
        resolve_language("target", "Custom"),
        Err(ConfigurationError::InvalidLanguage { role: "target", .. })
    ));
    assert!(is_placeholder("choose a language"));
    assert!(!is_placeholder("English"));
}

#[test]
fn test_presetLanguages_shouldAllResolveToThemselves() {
    for preset in PRESET_LANGUAGES {
        assert_eq!(resolve_language("target", preset).unwrap(), *preset);
    }
}

#[test]
fn test_normalizeToPart2t_shouldHandleBothCodeLengths() {
    assert_eq!(normalize_to_part2t("fr").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("ger").unwrap(), "deu");
    assert!(normalize_to_part2t("zz").is_err());
    assert_eq!(get_language_name("ja").unwrap(), "Japanese");
}
