// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use contextual_translator::app_config::{self, Config, TranslationProvider};
use contextual_translator::app_controller::{Controller, TranslateOptions};
use contextual_translator::file_utils::FileManager;
use contextual_translator::translation::SegmentationStrategy;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Gemini,
    OpenAI,
    Anthropic,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Gemini => TranslationProvider::Gemini,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// CLI Wrapper for SegmentationStrategy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliStrategy {
    None,
    Paragraphs,
    Sentences,
    Lines,
    Smart,
}

impl From<CliStrategy> for SegmentationStrategy {
    fn from(cli_strategy: CliStrategy) -> Self {
        match cli_strategy {
            CliStrategy::None => SegmentationStrategy::None,
            CliStrategy::Paragraphs => SegmentationStrategy::Paragraphs,
            CliStrategy::Sentences => SegmentationStrategy::Sentences,
            CliStrategy::Lines => SegmentationStrategy::Lines,
            CliStrategy::Smart => SegmentationStrategy::Smart,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Options shared by every command that reads a document
#[derive(clap::Args, Debug)]
struct DocumentArgs {
    /// Document to process
    #[arg(value_name = "INPUT_FILE")]
    input_file: PathBuf,

    /// Source language (preset name, ISO code or custom name)
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language (preset name, ISO code or custom name)
    #[arg(short, long)]
    target_language: Option<String>,

    /// Segmentation strategy
    #[arg(long, value_enum)]
    strategy: Option<CliStrategy>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(clap::Args, Debug)]
struct TranslateArgs {
    #[command(flatten)]
    document: DocumentArgs,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model used for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Model used for back-translation and evaluation
    #[arg(long)]
    verification_model: Option<String>,

    /// Style or tone instructions for the translator
    #[arg(long)]
    instructions: Option<String>,

    /// Run the quality audit on every segment
    #[arg(long)]
    evaluate: bool,

    /// Your own API key; lifts the token ceiling
    #[arg(long, env = "CONTEXTUAL_TRANSLATOR_CREDENTIAL", hide_env_values = true)]
    credential: Option<String>,

    /// JSON results path (defaults to `<input>.<language>.json`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write results as CSV to this path
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a document segment by segment with full context
    Translate(TranslateArgs),

    /// Project the token cost of translating a document
    Estimate(DocumentArgs),

    /// Show how a document would be split into segments
    Segment(DocumentArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Contextual Translator
///
/// Translates documents segment by segment while giving the model the whole
/// document and everything translated so far, then back-translates each segment
/// so the meaning can be checked.
#[derive(Parser, Debug)]
#[command(name = "contextual-translator")]
#[command(version)]
#[command(about = "Context-aware document translation with back-translation checks")]
#[command(long_about = "Contextual Translator splits a document into segments and translates them in order.
Every request carries the full document and the translation so far.

EXAMPLES:
    contextual-translator translate essay.txt                      # Translate using default config
    contextual-translator translate -s en -t fr essay.txt          # English to French
    contextual-translator translate --strategy smart --evaluate essay.txt
    contextual-translator translate --csv out.csv -f essay.txt     # Also write CSV, overwrite outputs
    contextual-translator estimate essay.txt                       # Token projection only
    contextual-translator segment --strategy sentences essay.txt   # Preview segmentation
    contextual-translator completions bash > ct.bash               # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file does not exist,
    a default one is created automatically.

SUPPORTED PROVIDERS:
    gemini    - Google Gemini (default: gemini-3-flash-preview, GEMINI_API_KEY)
    openai    - OpenAI or compatible servers (OPENAI_API_KEY)
    anthropic - Anthropic Claude (ANTHROPIC_API_KEY)
    ollama    - Local Ollama server, no key needed")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker and ANSI colour for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("✖", "1;31"),
            Level::Warn => ("!", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("·", "1;36"),
            Level::Trace => ("…", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (marker, colour) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour,
                now,
                marker,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install at the most verbose level and narrow it once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "contextual-translator", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
        Commands::Estimate(args) => run_estimate(args),
        Commands::Segment(args) => run_segment(args),
    }
}

/// Load the configuration and apply the document-level command line overrides
fn load_config(args: &DocumentArgs) -> Result<Config> {
    if let Some(level) = &args.log_level {
        log::set_max_level(app_config::LogLevel::from(level.clone()).to_level_filter());
    }

    let mut config = Config::load_or_create(Path::new(&args.config_path))?;

    if let Some(source_language) = &args.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(target_language) = &args.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(strategy) = &args.strategy {
        config.pipeline.segmentation = strategy.clone().into();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone().into();
    }

    log::set_max_level(config.log_level.to_level_filter());
    Ok(config)
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let mut config = load_config(&args.document)?;

    if let Some(provider) = &args.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &args.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }
    if let Some(model) = &args.verification_model {
        config.translation.active_provider_config_mut().verification_model = model.clone();
    }
    if args.instructions.is_some() {
        config.pipeline.custom_instructions = args.instructions.clone();
    }
    if args.evaluate {
        config.pipeline.enable_evaluation = true;
    }

    let controller = Controller::with_config(config)?;
    let run = controller
        .run(TranslateOptions {
            input_file: args.document.input_file,
            output_file: args.output,
            csv_file: args.csv,
            credential: args.credential,
            force_overwrite: args.force_overwrite,
            show_progress: true,
        })
        .await?;

    let summary = run.summary();
    if summary.failed > 0 {
        return Err(anyhow::anyhow!("{} of {} segments failed", summary.failed, summary.total));
    }
    Ok(())
}

fn run_estimate(args: DocumentArgs) -> Result<()> {
    let controller = Controller::with_config(load_config(&args)?)?;
    let document = FileManager::read_document(&args.input_file)?;
    let report = controller.estimate(&document);

    let mut stdout = std::io::stdout();
    writeln!(stdout, "Strategy:           {}", controller.config().pipeline.segmentation)?;
    writeln!(stdout, "Segments:           {}", report.estimate.segment_count)?;
    writeln!(stdout, "Standard tokens:    {}", report.estimate.standard_tokens)?;
    writeln!(stdout, "Contextual tokens:  {}", report.estimate.contextual_tokens)?;
    writeln!(stdout, "Context overhead:   {}", report.estimate.context_overhead())?;
    writeln!(
        stdout,
        "Without a key:      {} (limit {})",
        if report.fits_without_credential { "allowed" } else { "refused" },
        report.ceiling
    )
    .context("Failed to write estimate")?;
    Ok(())
}

fn run_segment(args: DocumentArgs) -> Result<()> {
    let controller = Controller::with_config(load_config(&args)?)?;
    let document = FileManager::read_document(&args.input_file)?;

    let mut stdout = std::io::stdout();
    for (index, chunk) in controller.segment(&document).iter().enumerate() {
        writeln!(stdout, "--- segment {} ({} chars) ---", index + 1, chunk.chars().count())?;
        writeln!(stdout, "{}", chunk)?;
    }
    Ok(())
}
