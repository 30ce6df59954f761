/*!
 * Per-segment provider operations.
 *
 * `TranslationService` turns one pipeline stage into one retried provider call:
 * build the prompt, send it through the `RetryingInvoker`, trim the answer, and tag
 * any failure with the stage it happened in.
 */

use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use super::cost::estimate_tokens;
use super::pipeline::RunConfiguration;
use super::prompts::{TranslationPromptBuilder, back_translation_prompt, evaluation_prompt};
use super::retry::RetryingInvoker;
use crate::errors::{PipelineStage, TranslationError};
use crate::providers::{CompletionProvider, CompletionRequest, PromptKind};

/// Result of the translate stage
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateOutcome {
    /// Translated segment
    pub text: String,
    /// The prompt that produced it
    pub prompt_used: String,
}

/// Token counts the provider reported, summed over successful calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Calls whose response carried usage figures
    pub reported_calls: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Stage operations over a shared provider
#[derive(Debug, Clone)]
pub struct TranslationService {
    provider: Arc<dyn CompletionProvider>,
    invoker: RetryingInvoker,
    usage: Arc<Mutex<TokenUsage>>,
}

impl TranslationService {
    /// Create a service with the given provider and retry handling
    pub fn new(provider: Arc<dyn CompletionProvider>, invoker: RetryingInvoker) -> Self {
        Self {
            provider,
            invoker,
            usage: Arc::new(Mutex::new(TokenUsage::default())),
        }
    }

    /// Provider-reported usage so far
    pub fn usage(&self) -> TokenUsage {
        *self.usage.lock()
    }

    /// Forget usage from earlier runs
    pub fn reset_usage(&self) {
        *self.usage.lock() = TokenUsage::default();
    }

    /// The provider behind this service
    pub fn provider(&self) -> &Arc<dyn CompletionProvider> {
        &self.provider
    }

    /// Translate one segment in the context of the whole document
    pub async fn translate(
        &self,
        segment: &str,
        full_document: &str,
        translation_so_far: &str,
        config: &RunConfiguration,
    ) -> Result<TranslateOutcome, TranslationError> {
        let prompt = TranslationPromptBuilder::new(&config.source_language, &config.target_language)
            .with_segment(segment)
            .with_full_document(full_document)
            .with_translation_so_far(translation_so_far)
            .with_custom_instructions(config.custom_instructions.as_deref())
            .build();

        let text = self
            .call(PromptKind::Translate, &config.translation_model, &prompt, config)
            .await
            .map_err(|e| e.in_stage(PipelineStage::Translate))?;

        Ok(TranslateOutcome {
            text,
            prompt_used: prompt,
        })
    }

    /// Literal translation of `translated` back into the source language
    pub async fn back_translate(
        &self,
        translated: &str,
        config: &RunConfiguration,
    ) -> Result<String, TranslationError> {
        let prompt = back_translation_prompt(translated, &config.source_language, &config.target_language);

        self.call(PromptKind::BackTranslate, &config.verification_model, &prompt, config)
            .await
            .map_err(|e| e.in_stage(PipelineStage::BackTranslate))
    }

    /// Quality audit of one translated segment
    pub async fn evaluate(
        &self,
        original: &str,
        translated: &str,
        back_translated: &str,
        full_document: &str,
        config: &RunConfiguration,
    ) -> Result<String, TranslationError> {
        let prompt = evaluation_prompt(
            original,
            translated,
            back_translated,
            &config.source_language,
            &config.target_language,
            full_document,
        );

        self.call(PromptKind::Evaluate, &config.verification_model, &prompt, config)
            .await
            .map_err(|e| e.in_stage(PipelineStage::Evaluate))
    }

    async fn call(
        &self,
        kind: PromptKind,
        model: &str,
        prompt: &str,
        config: &RunConfiguration,
    ) -> Result<String, TranslationError> {
        debug!(
            "{} via {} ({}), prompt of {} chars",
            kind,
            self.provider.name(),
            model,
            prompt.chars().count()
        );

        let label = format!("{} request", kind);
        let provider = &self.provider;
        let response = self
            .invoker
            .invoke(&label, || {
                let request = CompletionRequest::new(kind, model, prompt)
                    .with_credential(config.credential.as_deref());
                provider.complete(request)
            })
            .await?;

        if response.prompt_tokens.is_some() || response.completion_tokens.is_some() {
            let prompt_tokens = response.prompt_tokens.unwrap_or_default();
            let completion_tokens = response.completion_tokens.unwrap_or_default();
            debug!(
                "{} used {} prompt + {} completion tokens (estimated prompt: {})",
                kind,
                prompt_tokens,
                completion_tokens,
                estimate_tokens(prompt)
            );
            let mut usage = self.usage.lock();
            usage.prompt_tokens += prompt_tokens;
            usage.completion_tokens += completion_tokens;
            usage.reported_calls += 1;
        }

        Ok(response.text.trim().to_string())
    }
}
