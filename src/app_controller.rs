use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

use crate::app_config::Config;
use crate::file_utils::{FileManager, OutputFormat};
use crate::providers::{self, CompletionProvider};
use crate::translation::cost::{self, CostEstimate};
use crate::translation::export;
use crate::translation::pipeline::{
    PipelineEvent, PipelineObserver, PipelineOrchestrator, PipelineRun, SegmentStatus,
};
use crate::translation::retry::RetryingInvoker;
use crate::translation::segmenter;
use crate::translation::service::TranslationService;

// @module: Application controller for document translation

/// What to translate and where to put the results
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Document to translate
    pub input_file: PathBuf,
    /// JSON results path; defaults to a file next to the input
    pub output_file: Option<PathBuf>,
    /// Optional CSV results path
    pub csv_file: Option<PathBuf>,
    /// Caller's own key
    pub credential: Option<String>,
    /// Replace existing output files
    pub force_overwrite: bool,
    /// Draw a progress bar
    pub show_progress: bool,
}

/// Cost projection together with the gate decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimateReport {
    pub estimate: CostEstimate,
    /// Ceiling applied without a credential
    pub ceiling: usize,
    /// Whether a run without a credential would be allowed
    pub fits_without_credential: bool,
}

/// Drives the progress bar from pipeline events
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    /// Visible bar, or a hidden one for quiet runs and tests
    pub fn new(visible: bool) -> Self {
        let bar = if visible { ProgressBar::new(0) } else { ProgressBar::hidden() };
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        Self { bar }
    }

    /// Segments that reached a terminal status so far
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl PipelineObserver for ProgressObserver {
    fn on_event(&mut self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RunStarted { segments } => {
                self.bar.set_length(segments.len() as u64);
                self.bar.set_position(0);
            }
            PipelineEvent::SegmentTransitioned { segment, .. } => {
                self.bar
                    .set_message(format!("segment {}: {}", segment.ordinal + 1, segment.status));
                if segment.status.is_terminal() {
                    self.bar.inc(1);
                }
                if segment.status == SegmentStatus::Error {
                    self.bar.println(format!(
                        "Segment {} failed: {}",
                        segment.ordinal + 1,
                        segment.error.as_deref().unwrap_or("unknown error")
                    ));
                }
            }
            PipelineEvent::RunFinished { outcome, summary } => {
                self.bar.finish_with_message(format!(
                    "{:?}: {} completed, {} failed",
                    outcome, summary.completed, summary.failed
                ));
            }
        }
    }
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Chunks the configured strategy produces for `document`
    pub fn segment(&self, document: &str) -> Vec<String> {
        segmenter::split(document, self.config.pipeline.segmentation)
    }

    /// Cost projection for `document`
    pub fn estimate(&self, document: &str) -> EstimateReport {
        let estimate = cost::estimate(document, self.config.pipeline.segmentation);
        let ceiling = self.config.translation.common.token_ceiling;
        EstimateReport {
            estimate,
            ceiling,
            fits_without_credential: estimate.fits_within(ceiling),
        }
    }

    /// Translate a document with the configured provider and write the results
    pub async fn run(&self, options: TranslateOptions) -> Result<PipelineRun> {
        let provider = providers::build_provider(&self.config.translation)?;
        self.run_with_provider(options, provider).await
    }

    /// Translate a document with `provider` and write the results
    pub async fn run_with_provider(
        &self,
        options: TranslateOptions,
        provider: Arc<dyn CompletionProvider>,
    ) -> Result<PipelineRun> {
        let start_time = std::time::Instant::now();
        let document = FileManager::read_document(&options.input_file)?;

        let output_file = options.output_file.clone().unwrap_or_else(|| {
            FileManager::generate_output_path(&options.input_file, &self.config.target_language, OutputFormat::Json)
        });
        // Fail before spending tokens if results could not be saved
        if FileManager::file_exists(&output_file) && !options.force_overwrite {
            return Err(anyhow::anyhow!(
                "Output file already exists: {:?}. Use -f to force overwrite.",
                output_file
            ));
        }

        let run_config = self.config.run_configuration(options.credential.as_deref());
        let service = TranslationService::new(
            Arc::clone(&provider),
            RetryingInvoker::new(self.config.translation.retry_policy()),
        );
        let usage_source = service.clone();
        let mut orchestrator = PipelineOrchestrator::new(service)
            .with_token_ceiling(self.config.translation.common.token_ceiling)
            .with_observer(ProgressObserver::new(options.show_progress));

        info!(
            "Translating {:?} with {} ({})",
            options.input_file,
            provider.name(),
            run_config.translation_model
        );

        let cancellation = orchestrator.cancellation_handle();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after the current segment");
                cancellation.cancel();
            }
        });

        let result = orchestrator.run(&document, &run_config).await;
        ctrl_c.abort();
        let run = result.context("Translation run failed")?.clone();

        let json = export::segments_to_json(&run.segments)?;
        FileManager::write_output(&output_file, &json, options.force_overwrite)?;
        info!("Results written to {:?}", output_file);

        if let Some(csv_file) = &options.csv_file {
            let csv = export::segments_to_csv(&run.segments)?;
            FileManager::write_output(csv_file, &csv, options.force_overwrite)?;
            info!("CSV written to {:?}", csv_file);
        }

        let usage = usage_source.usage();
        if usage.reported_calls > 0 {
            info!(
                "Provider reported {} tokens over {} calls (projected {})",
                usage.total(),
                usage.reported_calls,
                cost::estimate(&document, run_config.strategy).contextual_tokens
            );
        }

        let summary = run.summary();
        if summary.failed > 0 {
            error!("{} of {} segments failed", summary.failed, summary.total);
        }
        info!(
            "Done in {:.1}s: {} completed, {} failed, {} not started",
            start_time.elapsed().as_secs_f32(),
            summary.completed,
            summary.failed,
            summary.idle
        );

        Ok(run)
    }
}
