/*!
 * Segment translation pipeline.
 *
 * - `segment`: the per-segment record and its status state machine
 * - `run_config`: immutable settings for one run
 * - `orchestrator`: the sequential loop, events and cancellation
 */

pub mod orchestrator;
pub mod run_config;
pub mod segment;

// Re-export types used externally
pub use orchestrator::{
    CallbackObserver, CancellationHandle, DEFAULT_TOKEN_CEILING, EVALUATION_UNAVAILABLE, PipelineEvent,
    PipelineObserver, PipelineOrchestrator, PipelineRun, RunOutcome, RunSummary,
};
pub use run_config::RunConfiguration;
pub use segment::{Segment, SegmentStatus};
