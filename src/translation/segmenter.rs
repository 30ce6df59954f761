/*!
 * Document segmentation.
 *
 * Splits a document into the ordered chunks that the pipeline translates one at a
 * time. Every strategy trims its chunks and drops the empty ones, so callers never
 * see a whitespace-only segment.
 */

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Character cap for a `smart` chunk
pub const SMART_CHUNK_MAX_CHARS: usize = 500;

// One or more blank lines (lines holding only whitespace count as blank)
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n\s*\n").expect("paragraph pattern is valid")
});

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n").expect("line pattern is valid"));

// A sentence runs up to its terminator run, which may be followed by one closing
// quote. The second branch picks up trailing text that never got a terminator.
static SENTENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^.!?]*[.!?]+["'”’»]?|[^.!?]+$"#).expect("sentence pattern is valid")
});

/// Rule used to partition a document into segments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SegmentationStrategy {
    /// Whole document as a single segment
    None,
    /// Split on blank lines
    #[default]
    Paragraphs,
    /// Split after sentence terminators
    Sentences,
    /// Split on every line break
    Lines,
    /// Sentences packed into chunks of at most 500 characters
    Smart,
}

impl SegmentationStrategy {
    /// All strategies, in display order
    pub const ALL: [SegmentationStrategy; 5] = [
        Self::None,
        Self::Paragraphs,
        Self::Sentences,
        Self::Lines,
        Self::Smart,
    ];

    /// Short human readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::None => "Whole document in one request. Cheapest, no segment-level verification.",
            Self::Paragraphs => "Best for articles and essays. Preserves flow.",
            Self::Sentences => "Granular precision. Good for complex syntax.",
            Self::Lines => "Best for poetry, lyrics, or lists.",
            Self::Smart => "Groups sentences (~500 chars) to balance context and speed.",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Paragraphs => "paragraphs",
            Self::Sentences => "sentences",
            Self::Lines => "lines",
            Self::Smart => "smart",
        }
    }
}

impl fmt::Display for SegmentationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SegmentationStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "paragraphs" | "paragraph" => Ok(Self::Paragraphs),
            "sentences" | "sentence" => Ok(Self::Sentences),
            "lines" | "line" => Ok(Self::Lines),
            "smart" => Ok(Self::Smart),
            _ => Err(anyhow!("Invalid segmentation strategy: {}", s)),
        }
    }
}

/// Split a document into ordered, trimmed, non-empty chunks.
///
/// Whitespace-only input yields no chunks for every strategy.
pub fn split(text: &str, strategy: SegmentationStrategy) -> Vec<String> {
    match strategy {
        SegmentationStrategy::None => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            }
        }
        SegmentationStrategy::Paragraphs => clean(PARAGRAPH_BREAK.split(text)),
        SegmentationStrategy::Lines => clean(LINE_BREAK.split(text)),
        SegmentationStrategy::Sentences => split_sentences(text),
        SegmentationStrategy::Smart => pack_sentences(split_sentences(text), SMART_CHUNK_MAX_CHARS),
    }
}

fn clean<'a>(pieces: impl Iterator<Item = &'a str>) -> Vec<String> {
    pieces
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_sentences(text: &str) -> Vec<String> {
    clean(SENTENCE.find_iter(text).map(|m| m.as_str()))
}

/// Greedily join consecutive sentences while the chunk stays within `max_chars`.
///
/// A sentence longer than `max_chars` on its own becomes its own chunk, unsplit.
fn pack_sentences(sentences: Vec<String>, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences {
        let sentence_len = sentence.chars().count();

        if current.is_empty() {
            current = sentence;
            current_len = sentence_len;
            continue;
        }

        // +1 for the joining space
        if current_len + 1 + sentence_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current = sentence;
            current_len = sentence_len;
        } else {
            current.push(' ');
            current.push_str(&sentence);
            current_len += 1 + sentence_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
