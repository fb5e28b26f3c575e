//! Speaker attribution for merged transcript segments.
//!
//! Segments are partitioned into consecutive batches and sent to the
//! inference model together with the known cast. The model returns
//! `{index, speaker, confidence}` votes using batch-local indices; the
//! labeler resolves them back to global positions through the batch
//! offset. A batch whose response fails to parse degrades to empty
//! speaker labels rather than failing the episode.

use crate::captions::Segment;
use crate::config::{LabelingSettings, Prompts};
use crate::error::Result;
use crate::inference::{strip_code_fences, ChatModel};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A single attribution vote from the model, using batch-local indices.
#[derive(Debug, Deserialize)]
struct SpeakerVote {
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    speaker: String,
    /// Accepted but not used for filtering.
    #[serde(default)]
    confidence: f64,
}

/// Assigns speaker identities to segments via batched inference.
pub struct SpeakerLabeler {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
    podcast_name: String,
    hosts: Vec<String>,
    batch_size: usize,
    max_concurrent_batches: usize,
}

impl SpeakerLabeler {
    pub fn new(model: Arc<dyn ChatModel>, prompts: Prompts, settings: &LabelingSettings) -> Self {
        Self {
            model,
            prompts,
            podcast_name: settings.podcast_name.clone(),
            hosts: settings.hosts.clone(),
            batch_size: settings.batch_size.max(1),
            max_concurrent_batches: settings.max_concurrent_batches.max(1),
        }
    }

    /// Label all segments, preserving input length and order.
    ///
    /// Issues exactly `ceil(segments / batch_size)` inference calls.
    /// Batches may run concurrently, but results are assembled in input
    /// order, not arrival order.
    pub async fn label(&self, segments: &[Segment], guest_name: &str) -> Result<Vec<Segment>> {
        if segments.is_empty() {
            return Ok(Vec::new());
        }

        let batches: Vec<(usize, &[Segment])> = segments
            .chunks(self.batch_size)
            .enumerate()
            .map(|(i, batch)| (i * self.batch_size, batch))
            .collect();

        debug!(
            "Labeling {} segments in {} batches of up to {}",
            segments.len(),
            batches.len(),
            self.batch_size
        );

        // `buffered` (not `buffer_unordered`): assembly order must match
        // input order even when batches complete out of order.
        let results: Vec<Result<Vec<Segment>>> = stream::iter(batches)
            .map(|(batch_offset, batch)| self.label_batch(batch_offset, batch, guest_name))
            .buffered(self.max_concurrent_batches)
            .collect()
            .await;

        let mut labeled = Vec::with_capacity(segments.len());
        for result in results {
            labeled.extend(result?);
        }
        Ok(labeled)
    }

    /// Label one batch of segments.
    async fn label_batch(
        &self,
        batch_offset: usize,
        batch: &[Segment],
        guest_name: &str,
    ) -> Result<Vec<Segment>> {
        let segments_text = batch
            .iter()
            .enumerate()
            .map(|(i, seg)| {
                format!(
                    "[{}] ({:.1}s - {:.1}s): {}",
                    i, seg.start_time, seg.end_time, seg.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut vars = HashMap::new();
        vars.insert("podcast_name".to_string(), self.podcast_name.clone());
        vars.insert("hosts".to_string(), self.hosts.join(", "));
        vars.insert("guest_name".to_string(), guest_name.to_string());
        vars.insert("segments".to_string(), segments_text);

        let system = self
            .prompts
            .render_with_custom(&self.prompts.speaker.system, &vars);
        let user = self
            .prompts
            .render_with_custom(&self.prompts.speaker.user, &vars);

        let content = self.model.complete(&system, &user).await?;
        let votes = Self::parse_votes(&content, batch_offset);

        let labeled = batch
            .iter()
            .enumerate()
            .map(|(i, seg)| {
                let vote = votes.iter().find(|v| v.index == Some(i));
                if let Some(v) = vote {
                    debug!(
                        batch_offset,
                        local_index = i,
                        speaker = %v.speaker,
                        confidence = v.confidence,
                        "attributed segment"
                    );
                }
                seg.with_speaker(vote.map(|v| v.speaker.clone()).unwrap_or_default())
            })
            .collect();

        Ok(labeled)
    }

    /// Parse attribution votes, failing open to an empty list.
    fn parse_votes(content: &str, batch_offset: usize) -> Vec<SpeakerVote> {
        let stripped = strip_code_fences(content);
        match serde_json::from_str(stripped) {
            Ok(votes) => votes,
            Err(e) => {
                warn!(
                    batch_offset,
                    error = %e,
                    "Failed to parse speaker attribution response, leaving batch unlabeled"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelingSettings;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Model that replays scripted responses in call order.
    struct ScriptedModel {
        responses: Mutex<VecDeque<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(String::from).collect()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            Ok(responses.pop_front().unwrap_or_else(|| "[]".to_string()))
        }
    }

    fn segments(n: usize) -> Vec<Segment> {
        (0..n)
            .map(|i| Segment {
                start_time: i as f64,
                end_time: i as f64 + 0.9,
                text: format!("segment {}", i),
                speaker: String::new(),
            })
            .collect()
    }

    fn labeler(model: Arc<dyn ChatModel>, batch_size: usize) -> SpeakerLabeler {
        let settings = LabelingSettings {
            batch_size,
            max_concurrent_batches: 1,
            ..LabelingSettings::default()
        };
        SpeakerLabeler::new(model, Prompts::default(), &settings)
    }

    #[tokio::test]
    async fn test_batch_count_is_ceiling() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let labeler = labeler(model.clone(), 20);

        let labeled = labeler.label(&segments(45), "Jane Doe").await.unwrap();
        assert_eq!(labeled.len(), 45);
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let model = Arc::new(ScriptedModel::new(vec![]));
        let labeler = labeler(model.clone(), 20);

        let labeled = labeler.label(&[], "Jane Doe").await.unwrap();
        assert!(labeled.is_empty());
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_response_fails_open() {
        let model = Arc::new(ScriptedModel::new(vec!["this is not json"]));
        let labeler = labeler(model, 20);

        let input = segments(5);
        let labeled = labeler.label(&input, "Jane Doe").await.unwrap();

        assert_eq!(labeled.len(), 5);
        for (orig, got) in input.iter().zip(&labeled) {
            assert_eq!(got.text, orig.text);
            assert_eq!(got.speaker, "");
        }
    }

    #[tokio::test]
    async fn test_fenced_response_is_parsed() {
        let response = "```json\n[{\"index\": 0, \"speaker\": \"Jane Doe\", \"confidence\": 0.9}]\n```";
        let model = Arc::new(ScriptedModel::new(vec![response]));
        let labeler = labeler(model, 20);

        let labeled = labeler.label(&segments(2), "Jane Doe").await.unwrap();
        assert_eq!(labeled[0].speaker, "Jane Doe");
        assert_eq!(labeled[1].speaker, "");
    }

    #[tokio::test]
    async fn test_batch_local_indices_map_to_global_positions() {
        // Two batches of 2; each response addresses local index 1.
        let model = Arc::new(ScriptedModel::new(vec![
            r#"[{"index": 1, "speaker": "Host A", "confidence": 1.0}]"#,
            r#"[{"index": 1, "speaker": "Jane Doe", "confidence": 1.0}]"#,
        ]));
        let labeler = labeler(model, 2);

        let labeled = labeler.label(&segments(4), "Jane Doe").await.unwrap();
        assert_eq!(labeled[0].speaker, "");
        assert_eq!(labeled[1].speaker, "Host A");
        assert_eq!(labeled[2].speaker, "");
        assert_eq!(labeled[3].speaker, "Jane Doe");
    }

    #[tokio::test]
    async fn test_first_matching_vote_wins() {
        let response = r#"[
            {"index": 0, "speaker": "First", "confidence": 0.5},
            {"index": 0, "speaker": "Second", "confidence": 0.9}
        ]"#;
        let model = Arc::new(ScriptedModel::new(vec![response]));
        let labeler = labeler(model, 20);

        let labeled = labeler.label(&segments(1), "Jane Doe").await.unwrap();
        assert_eq!(labeled[0].speaker, "First");
    }

    #[tokio::test]
    async fn test_vote_without_index_is_ignored() {
        let response = r#"[{"speaker": "Nobody", "confidence": 0.9}]"#;
        let model = Arc::new(ScriptedModel::new(vec![response]));
        let labeler = labeler(model, 20);

        let labeled = labeler.label(&segments(1), "Jane Doe").await.unwrap();
        assert_eq!(labeled[0].speaker, "");
    }
}
