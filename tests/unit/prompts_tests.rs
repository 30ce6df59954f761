/*!
 * Tests for prompt construction
 */

use contextual_translator::translation::prompts::{back_translation_prompt, evaluation_prompt};
use contextual_translator::translation::{PromptTemplate, TranslationPromptBuilder};

use crate::common::SAMPLE_ESSAY;

#[test]
fn test_build_firstSegment_shouldOmitTranslationSoFar() {
    let prompt = TranslationPromptBuilder::new("English", "French")
        .with_full_document(SAMPLE_ESSAY)
        .with_segment("The river rose overnight.")
        .build();

    assert!(prompt.starts_with(PromptTemplate::TRANSLATOR_ROLE));
    assert!(prompt.contains("from English to French"));
    assert!(prompt.contains("Full Document Context:\n\"\"\"\n"));
    assert!(!prompt.contains("Translation So Far"));
    assert!(prompt.ends_with("Segment to Translate:\n\"\"\"\nThe river rose overnight.\n\"\"\""));
}

#[test]
fn test_build_laterSegment_shouldIncludeTranslationSoFarBeforeSegment() {
    let prompt = TranslationPromptBuilder::new("English", "French")
        .with_full_document(SAMPLE_ESSAY)
        .with_translation_so_far("La rivière est montée pendant la nuit.")
        .with_segment("By morning the bridge was gone.")
        .build();

    let history = prompt.find("Translation So Far:").unwrap();
    let segment = prompt.find("Segment to Translate:").unwrap();
    assert!(history < segment);
    assert!(prompt.contains("La rivière est montée pendant la nuit."));
}

#[test]
fn test_build_wholeDocument_shouldUseSingleShotShape() {
    let prompt = TranslationPromptBuilder::new("English", "German")
        .with_full_document(SAMPLE_ESSAY)
        .with_segment(SAMPLE_ESSAY)
        .with_custom_instructions(Some("Keep it informal."))
        .build();

    assert!(!prompt.contains("Full Document Context"));
    assert!(prompt.contains("Style/tone instructions:\nKeep it informal."));
    assert!(prompt.contains("Text to Translate:"));
}

#[test]
fn test_build_shouldBeDeterministic() {
    let builder = TranslationPromptBuilder::new("English", "Japanese")
        .with_full_document(SAMPLE_ESSAY)
        .with_segment("Nobody in the village was surprised.");
    assert_eq!(builder.build(), builder.clone().build());
}

#[test]
fn test_backTranslationPrompt_shouldSwapLanguageDirection() {
    let prompt = back_translation_prompt("Le pont a disparu.", "English", "French");
    assert!(prompt.contains("from French back to English"));
    assert!(prompt.ends_with("\"\"\"\nLe pont a disparu.\n\"\"\""));
}

#[test]
fn test_evaluationPrompt_shouldCarryAllThreeTexts() {
    let prompt = evaluation_prompt(
        "The bridge was gone.",
        "Le pont avait disparu.",
        "The bridge had disappeared.",
        "English",
        "French",
        SAMPLE_ESSAY,
    );

    assert!(prompt.contains("Original (English)"));
    assert!(prompt.contains("Translation (French)"));
    assert!(prompt.contains("Back-Translation (English)"));
    assert!(prompt.contains("Do NOT re-translate"));
}
