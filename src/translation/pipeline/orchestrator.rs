/*!
 * Pipeline orchestrator for contextual document translation.
 *
 * The orchestrator drives every segment, strictly one at a time, through:
 * 1. Translate: context-aware translation fed with everything translated so far
 * 2. Verify: literal back-translation into the source language
 * 3. Evaluate (optional): quality audit, degraded to a placeholder on failure
 *
 * Each status change is reported to the observer right after it happens. Failures
 * stay with their segment, and only a configuration error or cancellation ends a
 * run early. Cancellation is checked between segments, so an in-flight call always
 * finishes.
 */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, error, info, warn};
use tokio::sync::mpsc::UnboundedSender;

use super::run_config::RunConfiguration;
use super::segment::{Segment, SegmentStatus};
use crate::errors::{ConfigurationError, PipelineError};
use crate::translation::cost::{self, CostEstimate};
use crate::translation::segmenter;
use crate::translation::service::TranslationService;

/// Token ceiling for runs without a caller-supplied credential
pub const DEFAULT_TOKEN_CEILING: usize = 100_000;

/// Evaluation text stored when the quality audit request fails
pub const EVALUATION_UNAVAILABLE: &str = "Evaluation unavailable: the quality audit request failed.";

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every segment reached a terminal status
    Completed,
    /// Stopped early; remaining segments stay idle
    Cancelled,
}

/// Counts per status at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub idle: usize,
}

/// Notifications emitted while a run progresses, in emission order
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// Segments were created, all idle
    RunStarted {
        /// Snapshot of the new segments
        segments: Vec<Segment>,
    },
    /// One segment changed status
    SegmentTransitioned {
        /// Snapshot after the change
        segment: Segment,
        /// Status before the change
        from: SegmentStatus,
        /// Accumulated translation at the time of the change
        accumulated_translation: String,
    },
    /// The loop ended
    RunFinished {
        outcome: RunOutcome,
        summary: RunSummary,
    },
}

/// Receives pipeline events
pub trait PipelineObserver: Send {
    fn on_event(&mut self, event: &PipelineEvent);
}

/// Forward events over a channel. A closed receiver is ignored.
impl PipelineObserver for UnboundedSender<PipelineEvent> {
    fn on_event(&mut self, event: &PipelineEvent) {
        let _ = self.send(event.clone());
    }
}

/// Adapts a closure into an observer
pub struct CallbackObserver<F>(pub F);

impl<F> PipelineObserver for CallbackObserver<F>
where
    F: FnMut(&PipelineEvent) + Send,
{
    fn on_event(&mut self, event: &PipelineEvent) {
        (self.0)(event)
    }
}

/// Cooperative cancellation flag shared with the caller
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    flag: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running pipeline to stop before its next segment
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// State of the latest run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineRun {
    /// Segments in ordinal order
    pub segments: Vec<Segment>,
    /// Translations of finished translate stages, newline-joined in order
    pub accumulated_translation: String,
    /// Set once the loop ends
    pub outcome: Option<RunOutcome>,
}

impl PipelineRun {
    fn new(chunks: Vec<String>) -> Self {
        Self {
            segments: chunks
                .into_iter()
                .enumerate()
                .map(|(ordinal, chunk)| Segment::new(ordinal, chunk))
                .collect(),
            accumulated_translation: String::new(),
            outcome: None,
        }
    }

    fn append_translation(&mut self, text: &str) {
        if !self.accumulated_translation.is_empty() {
            self.accumulated_translation.push('\n');
        }
        self.accumulated_translation.push_str(text);
    }

    /// Status counts
    pub fn summary(&self) -> RunSummary {
        let count = |status: SegmentStatus| self.segments.iter().filter(|s| s.status == status).count();
        RunSummary {
            total: self.segments.len(),
            completed: count(SegmentStatus::Completed),
            failed: count(SegmentStatus::Error),
            idle: count(SegmentStatus::Idle),
        }
    }
}

/// Drives a document through the per-segment state machine
pub struct PipelineOrchestrator {
    service: TranslationService,
    observer: Option<Box<dyn PipelineObserver>>,
    cancellation: CancellationHandle,
    token_ceiling: usize,
    run: PipelineRun,
}

impl PipelineOrchestrator {
    /// Create an orchestrator with no observer and the default ceiling
    pub fn new(service: TranslationService) -> Self {
        Self {
            service,
            observer: None,
            cancellation: CancellationHandle::new(),
            token_ceiling: DEFAULT_TOKEN_CEILING,
            run: PipelineRun::default(),
        }
    }

    /// Report events to `observer`
    pub fn with_observer(mut self, observer: impl PipelineObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Ceiling applied when no credential is supplied
    pub fn with_token_ceiling(mut self, ceiling: usize) -> Self {
        self.token_ceiling = ceiling;
        self
    }

    /// Handle the caller can use to stop the run between segments
    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancellation.clone()
    }

    /// The latest run
    pub fn current_run(&self) -> &PipelineRun {
        &self.run
    }

    /// Check everything that must hold before the first request is sent.
    ///
    /// Returns the configuration with resolved languages and the cost projection.
    pub fn preflight(
        &self,
        document: &str,
        config: &RunConfiguration,
    ) -> Result<(RunConfiguration, CostEstimate), ConfigurationError> {
        if document.trim().is_empty() {
            return Err(ConfigurationError::EmptyDocument);
        }

        let config = config.validated()?;

        let provider = self.service.provider();
        if provider.requires_credential() && !provider.has_configured_key() && !config.has_credential() {
            return Err(ConfigurationError::MissingCredential(provider.name().to_string()));
        }

        let estimate = cost::estimate(document, config.strategy);
        if !config.has_credential() && !estimate.fits_within(self.token_ceiling) {
            return Err(ConfigurationError::QuotaExceeded {
                estimated: estimate.contextual_tokens,
                ceiling: self.token_ceiling,
            });
        }

        Ok((config, estimate))
    }

    /// Translate `document`, replacing any previous run.
    ///
    /// # Errors
    /// Only pre-run configuration problems and state machine violations are
    /// returned; segment failures are recorded on the segments themselves.
    pub async fn run(&mut self, document: &str, config: &RunConfiguration) -> Result<&PipelineRun, PipelineError> {
        let (config, estimate) = self.preflight(document, config)?;
        let start_time = Instant::now();

        self.run = PipelineRun::new(segmenter::split(document, config.strategy));
        self.cancellation.reset();
        self.service.reset_usage();

        info!(
            "Translating {} segments from {} to {} ({} strategy, ~{} tokens)",
            self.run.segments.len(),
            config.source_language,
            config.target_language,
            config.strategy,
            estimate.contextual_tokens
        );

        let snapshot = self.run.segments.clone();
        self.emit(PipelineEvent::RunStarted { segments: snapshot });

        let mut outcome = RunOutcome::Completed;
        for index in 0..self.run.segments.len() {
            if self.cancellation.is_cancelled() {
                info!("Run cancelled before segment {}", index);
                outcome = RunOutcome::Cancelled;
                break;
            }
            self.process_segment(index, document, &config).await?;
        }

        self.run.outcome = Some(outcome);
        let summary = self.run.summary();
        info!(
            "Run {:?} in {:.2}s: {} completed, {} failed, {} not started",
            outcome,
            start_time.elapsed().as_secs_f32(),
            summary.completed,
            summary.failed,
            summary.idle
        );
        self.emit(PipelineEvent::RunFinished { outcome, summary });

        Ok(&self.run)
    }

    async fn process_segment(
        &mut self,
        index: usize,
        document: &str,
        config: &RunConfiguration,
    ) -> Result<(), PipelineError> {
        let original = self.run.segments[index].original.clone();
        let translation_so_far = self.run.accumulated_translation.clone();
        self.transition(index, SegmentStatus::Translating)?;

        let translated = match self
            .service
            .translate(&original, document, &translation_so_far, config)
            .await
        {
            Ok(outcome) => {
                self.run.append_translation(&outcome.text);
                let segment = &mut self.run.segments[index];
                segment.translated = Some(outcome.text.clone());
                segment.prompt_used = Some(outcome.prompt_used);
                self.transition(index, SegmentStatus::Verifying)?;
                outcome.text
            }
            Err(e) => return self.fail(index, e.to_string()),
        };

        let back_translated = match self.service.back_translate(&translated, config).await {
            Ok(text) => {
                self.run.segments[index].back_translated = Some(text.clone());
                text
            }
            Err(e) => return self.fail(index, e.to_string()),
        };

        if !config.enable_evaluation {
            return self.transition(index, SegmentStatus::Completed);
        }

        self.transition(index, SegmentStatus::Evaluating)?;
        let evaluation = match self
            .service
            .evaluate(&original, &translated, &back_translated, document, config)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Segment {}: {}", index, e);
                EVALUATION_UNAVAILABLE.to_string()
            }
        };
        self.run.segments[index].evaluation = Some(evaluation);
        self.transition(index, SegmentStatus::Completed)
    }

    fn transition(&mut self, index: usize, next: SegmentStatus) -> Result<(), PipelineError> {
        let from = self.run.segments[index].advance(next)?;
        debug!("Segment {}: {} -> {}", index, from, next);
        self.emit_transition(index, from);
        Ok(())
    }

    fn fail(&mut self, index: usize, message: String) -> Result<(), PipelineError> {
        error!("Segment {}: {}", index, message);
        let from = self.run.segments[index].fail(message)?;
        self.emit_transition(index, from);
        Ok(())
    }

    fn emit_transition(&mut self, index: usize, from: SegmentStatus) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(&PipelineEvent::SegmentTransitioned {
                segment: self.run.segments[index].clone(),
                from,
                accumulated_translation: self.run.accumulated_translation.clone(),
            });
        }
    }

    fn emit(&mut self, event: PipelineEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(&event);
        }
    }
}
