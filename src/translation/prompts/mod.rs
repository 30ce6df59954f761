/*!
 * Prompt engineering for document translation.
 *
 * This module provides:
 * - The context-aware translate prompt builder
 * - Back-translation and evaluation templates
 */

pub mod templates;

// Re-export main types
pub use templates::{
    PromptTemplate, TranslationPromptBuilder, back_translation_prompt, evaluation_prompt,
};
