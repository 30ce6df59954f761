/*!
 * Token cost estimation.
 *
 * Projects how many tokens a run will send before any request is issued, so a run
 * without a caller-supplied key can be refused up front. The contextual projection
 * follows the shape of the translate prompt: every segment re-sends the full
 * document plus everything translated so far. A lone segment covering the whole
 * document is charged as one request, since it goes out as the single-shot prompt.
 */

use serde::Serialize;

use super::segmenter::{self, SegmentationStrategy};

/// Characters per token in the coarse heuristic
pub const CHARS_PER_TOKEN: usize = 4;

/// Fixed prompt scaffolding cost added to every request
pub const REQUEST_OVERHEAD_TOKENS: usize = 150;

/// Token projections for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CostEstimate {
    /// Cost of translating the whole document in one request
    pub standard_tokens: usize,
    /// Cumulative cost of the segmented, context-accumulating run
    pub contextual_tokens: usize,
    /// Number of segments the strategy produces
    pub segment_count: usize,
}

impl CostEstimate {
    /// Extra tokens the contextual run costs over a single request
    pub fn context_overhead(&self) -> usize {
        self.contextual_tokens.saturating_sub(self.standard_tokens)
    }

    /// Whether the contextual projection fits under `ceiling`
    pub fn fits_within(&self, ceiling: usize) -> bool {
        self.contextual_tokens <= ceiling
    }
}

/// Coarse token count: `ceil(chars / 4)`
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Project the cost of translating `text` with `strategy`
pub fn estimate(text: &str, strategy: SegmentationStrategy) -> CostEstimate {
    let document_tokens = estimate_tokens(text);
    let standard_tokens = document_tokens + REQUEST_OVERHEAD_TOKENS;

    if strategy == SegmentationStrategy::None {
        return CostEstimate {
            standard_tokens,
            contextual_tokens: standard_tokens,
            segment_count: 1,
        };
    }

    let segments = segmenter::split(text, strategy);

    // A lone segment covering the whole document is sent as the single-shot prompt
    if segments.len() == 1 && segments[0] == text.trim() {
        return CostEstimate {
            standard_tokens,
            contextual_tokens: standard_tokens,
            segment_count: 1,
        };
    }
    let mut history_tokens = 0;
    let mut contextual_tokens = 0;

    for segment in &segments {
        let segment_tokens = estimate_tokens(segment);
        contextual_tokens += document_tokens + history_tokens + segment_tokens + REQUEST_OVERHEAD_TOKENS;
        history_tokens += segment_tokens;
    }

    CostEstimate {
        standard_tokens,
        contextual_tokens,
        segment_count: segments.len(),
    }
}
