/*!
 * Contextual document translation.
 *
 * This module contains the translation pipeline and its building blocks:
 *
 * - `segmenter`: splitting a document into ordered chunks
 * - `cost`: token projections used to gate a run
 * - `prompts`: prompt templates and the translate prompt builder
 * - `retry`: bounded backoff for throttled provider calls
 * - `service`: one provider call per pipeline stage
 * - `pipeline`: the per-segment state machine and orchestrator
 * - `export`: JSON and CSV forms of the results
 */

// Re-export main types for easier usage
pub use self::cost::{CostEstimate, estimate};
pub use self::pipeline::{PipelineOrchestrator, RunConfiguration, Segment, SegmentStatus};
pub use self::prompts::{PromptTemplate, TranslationPromptBuilder};
pub use self::retry::{RetryPolicy, RetryingInvoker};
pub use self::segmenter::{SegmentationStrategy, split};
pub use self::service::{TokenUsage, TranslateOutcome, TranslationService};

// Submodules
pub mod cost;
pub mod export;
pub mod pipeline;
pub mod prompts;
pub mod retry;
pub mod segmenter;
pub mod service;
