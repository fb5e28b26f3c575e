//! WebVTT caption file parsing.
//!
//! Reads cue records from a WebVTT file. Malformed timestamps are fatal
//! for the file; the error carries the offending line for diagnostics.

use super::Cue;
use crate::error::{GjestError, Result};
use std::path::Path;
use tracing::debug;

/// Parse a WebVTT timestamp (`HH:MM:SS.mmm` or `MM:SS.mmm`) to seconds.
pub fn parse_timestamp(time_str: &str) -> Result<f64> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (
            h.parse::<u64>().map_err(|_| bad_timestamp(time_str))?,
            m.parse::<u64>().map_err(|_| bad_timestamp(time_str))?,
            s.parse::<f64>().map_err(|_| bad_timestamp(time_str))?,
        ),
        [m, s] => (
            0,
            m.parse::<u64>().map_err(|_| bad_timestamp(time_str))?,
            s.parse::<f64>().map_err(|_| bad_timestamp(time_str))?,
        ),
        _ => return Err(bad_timestamp(time_str)),
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(bad_timestamp(time_str));
    }

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

fn bad_timestamp(time_str: &str) -> GjestError {
    GjestError::CaptionParse(format!("invalid timestamp: {:?}", time_str))
}

/// Parse a WebVTT file into an ordered list of cues.
pub fn parse_vtt(path: &Path) -> Result<Vec<Cue>> {
    let content = std::fs::read_to_string(path)?;
    parse_vtt_str(&content)
}

/// Parse WebVTT content into an ordered list of cues.
///
/// Cue blocks are separated by blank lines. A block is a cue if one of its
/// lines contains the `-->` timing separator; the optional identifier line
/// before it and any cue settings after the end timestamp are ignored.
/// NOTE and STYLE blocks are skipped.
pub fn parse_vtt_str(content: &str) -> Result<Vec<Cue>> {
    let mut cues = Vec::new();
    let content = content.replace("\r\n", "\n");

    for block in content.split("\n\n") {
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .collect();

        if lines.is_empty() {
            continue;
        }

        let first = lines[0].trim();
        if first.starts_with("WEBVTT") || first.starts_with("NOTE") || first.starts_with("STYLE") {
            continue;
        }

        let Some(timing_idx) = lines.iter().position(|l| l.contains("-->")) else {
            continue;
        };

        let timing = lines[timing_idx];
        let (start_str, rest) = timing
            .split_once("-->")
            .ok_or_else(|| GjestError::CaptionParse(format!("invalid cue timing: {:?}", timing)))?;
        // Cue settings (e.g. "align:start") may follow the end timestamp.
        let end_str = rest
            .split_whitespace()
            .next()
            .ok_or_else(|| GjestError::CaptionParse(format!("invalid cue timing: {:?}", timing)))?;

        let start_time = parse_timestamp(start_str)?;
        let end_time = parse_timestamp(end_str)?;

        let text = lines[timing_idx + 1..].join(" ").trim().to_string();

        cues.push(Cue {
            start_time,
            end_time,
            text,
        });
    }

    debug!("Parsed {} cues", cues.len());
    Ok(cues)
}
