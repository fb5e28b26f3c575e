//! Caption parsing and merging.
//!
//! Turns a timed caption file into sentence-scale, speaker-attributable
//! segments: `vtt` parses cue records from disk, `merge` joins fragmentary
//! cues on punctuation and pause boundaries.

mod merge;
mod vtt;

pub use merge::merge_cues;
pub use vtt::{parse_timestamp, parse_vtt, parse_vtt_str};

use serde::{Deserialize, Serialize};

/// A single timed caption record, as read from the caption file.
///
/// Ephemeral: cues are consumed immediately by the merger.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
    /// Cue payload text.
    pub text: String,
}

/// A merged, sentence-scale unit derived from one or more cues.
///
/// Produced unlabeled by the merger; the speaker labeler emits a labeled
/// copy. `speaker` is the empty string when attribution is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds.
    pub start_time: f64,
    /// End time in seconds.
    pub end_time: f64,
    /// Merged text, trimmed and non-empty.
    pub text: String,
    /// Attributed speaker name, or empty if unknown.
    #[serde(default)]
    pub speaker: String,
}

impl Segment {
    /// Copy of this segment with the given speaker label.
    pub fn with_speaker(&self, speaker: impl Into<String>) -> Self {
        Self {
            start_time: self.start_time,
            end_time: self.end_time,
            text: self.text.clone(),
            speaker: speaker.into(),
        }
    }
}
