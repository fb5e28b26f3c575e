//! Cue merging: joins fragmentary captions into sentence-scale segments.

use super::{Cue, Segment};
use tracing::debug;

/// A pause longer than this splits segments even mid-sentence.
const MAX_GAP_SECONDS: f64 = 2.0;

/// Merge short cues into complete sentences.
///
/// Strategy: concatenate consecutive cues until the accumulated text ends
/// in sentence-ending punctuation or a >2s gap separates the cues. Either
/// condition alone is sufficient to split. Cues with empty text are
/// skipped; a trailing accumulator is always flushed at end of input.
pub fn merge_cues(cues: &[Cue]) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::new();
    let mut current_text = String::new();
    let mut current_start = 0.0;
    let mut current_end = 0.0;

    for cue in cues {
        let text = cue.text.trim();
        if text.is_empty() {
            continue;
        }

        if current_text.is_empty() {
            current_text = text.to_string();
            current_start = cue.start_time;
            current_end = cue.end_time;
            continue;
        }

        let gap = cue.start_time - current_end;
        let ends_sentence = current_text
            .trim_end()
            .ends_with(['.', '!', '?']);

        if ends_sentence || gap > MAX_GAP_SECONDS {
            merged.push(Segment {
                start_time: current_start,
                end_time: current_end,
                text: std::mem::take(&mut current_text).trim().to_string(),
                speaker: String::new(),
            });
            current_text = text.to_string();
            current_start = cue.start_time;
            current_end = cue.end_time;
        } else {
            current_text.push(' ');
            current_text.push_str(text);
            current_end = cue.end_time;
        }
    }

    if !current_text.trim().is_empty() {
        merged.push(Segment {
            start_time: current_start,
            end_time: current_end,
            text: current_text.trim().to_string(),
            speaker: String::new(),
        });
    }

    debug!("Merged {} cues into {} segments", cues.len(), merged.len());
    merged
}
