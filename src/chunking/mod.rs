//! Overlapping-window chunking of labeled segments.
//!
//! Splits merged segments into roughly fixed-size word windows, carrying a
//! deterministic word overlap between consecutive chunks and denormalizing
//! episode metadata onto each chunk for faceted retrieval.

use crate::captions::Segment;
use crate::metadata::EpisodeMetadata;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A fixed-size window of transcript text prepared for indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptChunk {
    pub episode_id: String,
    pub text: String,
    /// Speaker active when the chunk was flushed (last writer wins).
    pub speaker: String,
    pub start_time: f64,
    pub end_time: f64,
    /// 0-based, monotonically increasing within an episode.
    pub chunk_index: usize,
    pub guest_names: Vec<String>,
    pub industry: String,
    pub topic_tags: Vec<String>,
}

/// Configuration for chunking.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Target chunk size in words.
    pub chunk_size: usize,
    /// Words carried over from the end of one chunk into the next.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
        }
    }
}

/// Chunk merged segments into word windows with overlap.
///
/// A segment whose own speaker is empty inherits the previous segment's
/// speaker. The recorded speaker of a chunk is whichever speaker was
/// active at flush time, not a majority vote.
pub fn chunk_segments(
    segments: &[Segment],
    episode_id: &str,
    metadata: &EpisodeMetadata,
    config: &ChunkingConfig,
) -> Vec<TranscriptChunk> {
    let mut chunks: Vec<TranscriptChunk> = Vec::new();
    let mut current_words: Vec<String> = Vec::new();
    let mut current_start = 0.0;
    let mut current_end = 0.0;
    let mut current_speaker = String::new();
    let mut chunk_index = 0;

    for segment in segments {
        let words: Vec<&str> = segment.text.split_whitespace().collect();
        let speaker = if segment.speaker.is_empty() {
            current_speaker.clone()
        } else {
            segment.speaker.clone()
        };

        // A segment longer than chunk_size is fed in slices, so a single
        // long monologue still yields multiple overlapping windows.
        for slice in words.chunks(config.chunk_size.max(1)) {
            if current_words.is_empty() {
                current_start = segment.start_time;
                current_speaker = speaker.clone();
            }

            if current_words.len() + slice.len() > config.chunk_size && !current_words.is_empty() {
                chunks.push(build_chunk(
                    episode_id,
                    metadata,
                    &current_words,
                    &current_speaker,
                    current_start,
                    current_end,
                    chunk_index,
                ));
                chunk_index += 1;

                // Carry the last `overlap` words into the next chunk.
                let carry_from = current_words.len().saturating_sub(config.overlap);
                current_words = current_words.split_off(carry_from);
                current_start = segment.start_time;
            }

            current_words.extend(slice.iter().map(|w| w.to_string()));
            current_end = segment.end_time;
            current_speaker = speaker.clone();
        }
    }

    if !current_words.is_empty() {
        chunks.push(build_chunk(
            episode_id,
            metadata,
            &current_words,
            &current_speaker,
            current_start,
            current_end,
            chunk_index,
        ));
    }

    debug!(
        "Chunked {} segments into {} chunks (size={}, overlap={})",
        segments.len(),
        chunks.len(),
        config.chunk_size,
        config.overlap
    );
    chunks
}

fn build_chunk(
    episode_id: &str,
    metadata: &EpisodeMetadata,
    words: &[String],
    speaker: &str,
    start_time: f64,
    end_time: f64,
    chunk_index: usize,
) -> TranscriptChunk {
    TranscriptChunk {
        episode_id: episode_id.to_string(),
        text: words.join(" "),
        speaker: speaker.to_string(),
        start_time,
        end_time,
        chunk_index,
        guest_names: metadata.guest_names.clone(),
        industry: metadata.industry.clone(),
        topic_tags: metadata.topic_tags.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: f64, text: &str, speaker: &str) -> Segment {
        Segment {
            start_time: start,
            end_time: end,
            text: text.to_string(),
            speaker: speaker.to_string(),
        }
    }

    fn metadata() -> EpisodeMetadata {
        EpisodeMetadata {
            title: "Test Episode".to_string(),
            guest_names: vec!["Jane Doe".to_string()],
            host_names: vec!["Host A".to_string(), "Host B".to_string()],
            industry: "Software".to_string(),
            topic_tags: vec!["testing".to_string()],
            summary: String::new(),
            episode_link: None,
            duration_seconds: 0,
            source_file: "test.vtt".to_string(),
        }
    }

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        let chunks = chunk_segments(&[], "ep", &metadata(), &ChunkingConfig::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_single_long_segment_produces_three_chunks_with_overlap() {
        let seg = segment(0.0, 900.0, &words(1500), "Jane Doe");
        let config = ChunkingConfig {
            chunk_size: 500,
            overlap: 50,
        };

        let chunks = chunk_segments(&[seg], "ep", &metadata(), &config);
        assert_eq!(chunks.len(), 3);
        assert_eq!(
            chunks.iter().map(|c| c.chunk_index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );

        // Chunk 1 leads with the trailing 50 words of chunk 0.
        let chunk0_words: Vec<&str> = chunks[0].text.split_whitespace().collect();
        let chunk1_words: Vec<&str> = chunks[1].text.split_whitespace().collect();
        assert_eq!(chunk0_words[chunk0_words.len() - 50..], chunk1_words[..50]);
    }

    #[test]
    fn test_short_input_is_one_chunk() {
        let segs = vec![
            segment(0.0, 5.0, "one two three.", "Host A"),
            segment(5.0, 10.0, "four five six.", "Host A"),
        ];
        let chunks = chunk_segments(&segs, "ep", &metadata(), &ChunkingConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "one two three. four five six.");
        assert_eq!(chunks[0].chunk_index, 0);
        assert!((chunks[0].start_time - 0.0).abs() < 1e-9);
        assert!((chunks[0].end_time - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_last_segment_speaker_wins() {
        let segs = vec![
            segment(0.0, 5.0, "a", "Host A"),
            segment(5.0, 10.0, "b", "Jane Doe"),
        ];
        let chunks = chunk_segments(&segs, "ep", &metadata(), &ChunkingConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].speaker, "Jane Doe");
    }

    #[test]
    fn test_empty_speaker_inherits_previous() {
        let segs = vec![
            segment(0.0, 5.0, "a", "Host A"),
            segment(5.0, 10.0, "b", ""),
        ];
        let chunks = chunk_segments(&segs, "ep", &metadata(), &ChunkingConfig::default());
        assert_eq!(chunks[0].speaker, "Host A");
    }

    #[test]
    fn test_overlap_larger_than_buffer_carries_everything() {
        let config = ChunkingConfig {
            chunk_size: 10,
            overlap: 50,
        };
        let segs = vec![
            segment(0.0, 1.0, &words(8), "A"),
            segment(1.0, 2.0, &words(8), "A"),
        ];

        let chunks = chunk_segments(&segs, "ep", &metadata(), &config);
        assert_eq!(chunks.len(), 2);
        // All 8 words of the first chunk are carried forward.
        let chunk1_words: Vec<&str> = chunks[1].text.split_whitespace().collect();
        assert_eq!(chunk1_words.len(), 16);
    }

    #[test]
    fn test_metadata_denormalized_onto_every_chunk() {
        let seg = segment(0.0, 600.0, &words(1200), "Jane Doe");
        let chunks = chunk_segments(&[seg], "ep", &metadata(), &ChunkingConfig::default());
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert_eq!(chunk.episode_id, "ep");
            assert_eq!(chunk.guest_names, vec!["Jane Doe".to_string()]);
            assert_eq!(chunk.industry, "Software");
            assert_eq!(chunk.topic_tags, vec!["testing".to_string()]);
        }
    }

    #[test]
    fn test_flush_end_time_is_last_merged_segment() {
        let config = ChunkingConfig {
            chunk_size: 10,
            overlap: 2,
        };
        let segs = vec![
            segment(0.0, 4.0, &words(8), "A"),
            segment(4.0, 8.0, &words(8), "B"),
        ];

        let chunks = chunk_segments(&segs, "ep", &metadata(), &config);
        assert_eq!(chunks.len(), 2);
        // First chunk closed before the second segment was appended.
        assert!((chunks[0].end_time - 4.0).abs() < 1e-9);
        assert_eq!(chunks[0].speaker, "A");
        // Second chunk starts at the segment that triggered the flush.
        assert!((chunks[1].start_time - 4.0).abs() < 1e-9);
        assert!((chunks[1].end_time - 8.0).abs() < 1e-9);
        assert_eq!(chunks[1].speaker, "B");
    }
}
