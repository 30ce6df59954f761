use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PipelineError;

/// Where a segment is in its pipeline
///
/// `idle -> translating -> verifying -> [evaluating] -> completed`, with any
/// working state allowed to drop into `error`. Nothing moves backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStatus {
    Idle,
    Translating,
    Verifying,
    Evaluating,
    Completed,
    Error,
}

impl SegmentStatus {
    /// `completed` and `error` end a segment's life
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// A call is in flight in this state
    pub fn is_working(self) -> bool {
        matches!(self, Self::Translating | Self::Verifying | Self::Evaluating)
    }

    /// Whether the state machine allows `self -> next`
    pub fn can_advance_to(self, next: SegmentStatus) -> bool {
        use SegmentStatus::*;
        matches!(
            (self, next),
            (Idle, Translating)
                | (Translating, Verifying)
                | (Verifying, Evaluating)
                | (Verifying, Completed)
                | (Evaluating, Completed)
                | (Translating, Error)
                | (Verifying, Error)
                | (Evaluating, Error)
        )
    }
}

impl fmt::Display for SegmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Translating => "translating",
            Self::Verifying => "verifying",
            Self::Evaluating => "evaluating",
            Self::Completed => "completed",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// One ordered chunk of the document and everything produced for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Opaque unique id
    pub id: String,
    /// Position in the document, contiguous from 0
    pub ordinal: usize,
    /// Source text
    pub original: String,
    #[serde(default)]
    pub translated: Option<String>,
    #[serde(default)]
    pub back_translated: Option<String>,
    #[serde(default)]
    pub evaluation: Option<String>,
    /// Exact translate-stage prompt
    #[serde(default)]
    pub prompt_used: Option<String>,
    pub status: SegmentStatus,
    #[serde(default)]
    pub error: Option<String>,
}

impl Segment {
    /// New idle segment with a fresh id
    pub fn new(ordinal: usize, original: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ordinal,
            original: original.into(),
            translated: None,
            back_translated: None,
            evaluation: None,
            prompt_used: None,
            status: SegmentStatus::Idle,
            error: None,
        }
    }

    /// Move to `next`, returning the previous status
    pub fn advance(&mut self, next: SegmentStatus) -> Result<SegmentStatus, PipelineError> {
        if !self.status.can_advance_to(next) {
            return Err(PipelineError::InvalidTransition {
                ordinal: self.ordinal,
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        let previous = self.status;
        self.status = next;
        Ok(previous)
    }

    /// Record a failure and move to `error`
    pub fn fail(&mut self, message: impl Into<String>) -> Result<SegmentStatus, PipelineError> {
        let previous = self.advance(SegmentStatus::Error)?;
        self.error = Some(message.into());
        Ok(previous)
    }
}
