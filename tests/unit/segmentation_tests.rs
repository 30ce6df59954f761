/*!
 * Tests for document segmentation and cost projection
 */

use contextual_translator::translation::cost::{REQUEST_OVERHEAD_TOKENS, estimate_tokens};
use contextual_translator::translation::segmenter::SMART_CHUNK_MAX_CHARS;
use contextual_translator::translation::{SegmentationStrategy, estimate, split};
use std::str::FromStr;

use crate::common::{SAMPLE_ESSAY, SAMPLE_POEM};

#[test]
fn test_split_paragraphs_shouldFollowBlankLines() {
    let chunks = split(SAMPLE_ESSAY, SegmentationStrategy::Paragraphs);
    assert_eq!(
        chunks,
        vec![
            "The river rose overnight.",
            "By morning the bridge was gone.",
            "Nobody in the village was surprised."
        ]
    );
}

#[test]
fn test_split_lines_shouldKeepEachVerse() {
    let chunks = split(SAMPLE_POEM, SegmentationStrategy::Lines);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[1], "On the fields we used to know");
}

#[test]
fn test_split_smart_shouldRespectChunkLimit() {
    let sentence = "This sentence has exactly forty chars.. ";
    let document = sentence.repeat(40);

    let chunks = split(&document, SegmentationStrategy::Smart);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= SMART_CHUNK_MAX_CHARS, "chunk too long: {}", chunk.len());
    }
}

#[test]
fn test_split_smart_overlongSentence_shouldStayWhole() {
    let long_sentence = format!("{}.", "word ".repeat(150).trim_end());
    let document = format!("Short one. {} Another short one.", long_sentence);

    let chunks = split(&document, SegmentationStrategy::Smart);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[1], long_sentence);
}

#[test]
fn test_split_shouldPreserveOrderAndContent() {
    for strategy in SegmentationStrategy::ALL {
        let joined: String = split(SAMPLE_ESSAY, strategy).concat();
        let expected: String = SAMPLE_ESSAY.chars().filter(|c| !c.is_whitespace()).collect();
        let actual: String = joined.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(actual, expected, "{strategy} lost or reordered text");
    }
}

#[test]
fn test_strategy_fromStr_shouldAcceptSingularForms() {
    assert_eq!(SegmentationStrategy::from_str("Sentence").unwrap(), SegmentationStrategy::Sentences);
    assert_eq!(SegmentationStrategy::from_str("smart").unwrap(), SegmentationStrategy::Smart);
    assert!(SegmentationStrategy::from_str("words").is_err());
}

#[test]
fn test_estimate_none_shouldEqualStandardCost() {
    let projection = estimate(SAMPLE_ESSAY, SegmentationStrategy::None);
    assert_eq!(projection.segment_count, 1);
    assert_eq!(projection.contextual_tokens, projection.standard_tokens);
    assert_eq!(projection.context_overhead(), 0);
}

#[test]
fn test_estimate_paragraphs_shouldAccumulateHistory() {
    let document = "aaaa\n\nbbbbbbbb";
    let document_tokens = estimate_tokens(document);
    let projection = estimate(document, SegmentationStrategy::Paragraphs);

    // Segment 1: document + segment; segment 2: document + history + segment
    let expected = (document_tokens + 1 + REQUEST_OVERHEAD_TOKENS)
        + (document_tokens + 1 + 2 + REQUEST_OVERHEAD_TOKENS);
    assert_eq!(projection.segment_count, 2);
    assert_eq!(projection.contextual_tokens, expected);
    assert!(projection.contextual_tokens > projection.standard_tokens);
}

#[test]
fn test_estimate_finerStrategies_shouldNeverBeCheaper() {
    let paragraphs = estimate(SAMPLE_ESSAY, SegmentationStrategy::Paragraphs);
    let none = estimate(SAMPLE_ESSAY, SegmentationStrategy::None);
    assert!(paragraphs.contextual_tokens >= none.contextual_tokens);
    assert!(paragraphs.fits_within(paragraphs.contextual_tokens));
    assert!(!paragraphs.fits_within(paragraphs.contextual_tokens - 1));
}
