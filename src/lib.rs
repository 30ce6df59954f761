/*!
 * # Contextual Translator
 *
 * A Rust library for context-aware document translation with AI.
 *
 * ## Features
 *
 * - Split documents by paragraph, sentence, line, or into ~500 character chunks
 * - Translate each segment with the full document and the translation so far as context
 * - Back-translate every segment and optionally audit its quality
 * - Project token cost before a run and refuse runs over the free ceiling
 * - Retry throttled requests with exponential backoff
 * - Export results as JSON or CSV
 * - Providers:
 *   - Google Gemini
 *   - OpenAI API
 *   - Anthropic API
 *   - Ollama (local LLM)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The translation pipeline:
 *   - `translation::segmenter`: Document segmentation
 *   - `translation::cost`: Token cost estimation
 *   - `translation::prompts`: Prompt construction
 *   - `translation::retry`: Backoff for throttled requests
 *   - `translation::service`: Translate, back-translate and evaluate calls
 *   - `translation::pipeline`: Segment state machine and run orchestration
 *   - `translation::export`: JSON and CSV output
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Language names and ISO code utilities
 * - `providers`: Client implementations for LLM providers
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ConfigurationError, PipelineError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, normalize_to_part2t, resolve_language};
pub use translation::{PipelineOrchestrator, RunConfiguration, Segment, SegmentStatus, TranslationService};
