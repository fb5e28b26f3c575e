//! Episode metadata extraction.
//!
//! Combines a filename heuristic (title and guest split on `" with "`)
//! with inference over bounded transcript excerpts. Every field has an
//! explicit fallback so a malformed model response is never fatal.

use crate::captions::Segment;
use crate::config::{IngestionSettings, Prompts};
use crate::error::Result;
use crate::inference::{strip_code_fences, ChatModel};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};

/// Trailing edit-status markers on exported caption filenames.
static EDIT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*_(?:un)?edited_\s*").unwrap());

/// Structured metadata for one episode, immutable after extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    pub title: String,
    pub guest_names: Vec<String>,
    pub host_names: Vec<String>,
    pub industry: String,
    pub topic_tags: Vec<String>,
    pub summary: String,
    pub episode_link: Option<String>,
    pub duration_seconds: u64,
    pub source_file: String,
}

/// Title and guest parsed from a caption filename.
#[derive(Debug, Clone, PartialEq)]
pub struct FilenameMetadata {
    pub title: String,
    pub guest_name: String,
}

/// Parse episode title and guest name from a caption filename.
///
/// Strips the extension and any `_unedited_`/`_edited_` marker, then
/// splits on the first `" with "`. Filenames without the separator yield
/// the whole name as the title and an empty guest.
pub fn parse_filename(filename: &str) -> FilenameMetadata {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let name = EDIT_MARKER.replace_all(stem, " ");
    let name = name.trim();

    match name.split_once(" with ") {
        Some((title, guest)) => FilenameMetadata {
            title: title.trim().to_string(),
            guest_name: guest.trim().to_string(),
        },
        None => FilenameMetadata {
            title: name.to_string(),
            guest_name: String::new(),
        },
    }
}

/// Build the bounded intro/outro excerpts passed to inference.
///
/// The outro is empty unless the transcript exceeds `outro_words`.
pub(crate) fn excerpt_windows(
    segments: &[Segment],
    intro_words: usize,
    outro_words: usize,
) -> (String, String) {
    let all_text = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let words: Vec<&str> = all_text.split_whitespace().collect();

    let intro = words[..words.len().min(intro_words)].join(" ");
    let outro = if words.len() > outro_words {
        words[words.len() - outro_words..].join(" ")
    } else {
        String::new()
    };

    (intro, outro)
}

/// Fields as returned by the model; every one optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModelMetadata {
    title: Option<String>,
    guest_names: Option<Vec<String>>,
    host_names: Option<Vec<String>>,
    industry: Option<String>,
    topic_tags: Option<Vec<String>>,
    summary: Option<String>,
}

/// Derives [`EpisodeMetadata`] from a filename and merged segments.
pub struct MetadataExtractor {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
    hosts: Vec<String>,
    intro_words: usize,
    outro_words: usize,
}

impl MetadataExtractor {
    pub fn new(
        model: Arc<dyn ChatModel>,
        prompts: Prompts,
        hosts: Vec<String>,
        ingestion: &IngestionSettings,
    ) -> Self {
        Self {
            model,
            prompts,
            hosts,
            intro_words: ingestion.intro_words,
            outro_words: ingestion.outro_words,
        }
    }

    /// Extract episode metadata from filename and transcript content.
    pub async fn extract(&self, filename: &str, segments: &[Segment]) -> Result<EpisodeMetadata> {
        let file_meta = parse_filename(filename);
        let (intro_text, outro_text) = excerpt_windows(segments, self.intro_words, self.outro_words);

        let mut vars = HashMap::new();
        vars.insert("filename".to_string(), filename.to_string());
        vars.insert("title".to_string(), file_meta.title.clone());
        vars.insert("guest_name".to_string(), file_meta.guest_name.clone());
        vars.insert("intro_words".to_string(), self.intro_words.to_string());
        vars.insert("outro_words".to_string(), self.outro_words.to_string());
        vars.insert("intro_text".to_string(), intro_text);
        vars.insert("outro_text".to_string(), outro_text);

        let system = self
            .prompts
            .render_with_custom(&self.prompts.metadata.system, &vars);
        let user = self
            .prompts
            .render_with_custom(&self.prompts.metadata.user, &vars);

        let content = self.model.complete(&system, &user).await?;
        let parsed: ModelMetadata = match serde_json::from_str(strip_code_fences(&content)) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    filename,
                    error = %e,
                    "Failed to parse metadata extraction response, using filename fallbacks"
                );
                ModelMetadata::default()
            }
        };

        let fallback_guests = if file_meta.guest_name.is_empty() {
            Vec::new()
        } else {
            vec![file_meta.guest_name.clone()]
        };

        let metadata = EpisodeMetadata {
            title: parsed.title.unwrap_or(file_meta.title),
            guest_names: parsed.guest_names.unwrap_or(fallback_guests),
            host_names: parsed.host_names.unwrap_or_else(|| self.hosts.clone()),
            industry: parsed.industry.unwrap_or_default(),
            topic_tags: parsed.topic_tags.unwrap_or_default(),
            summary: parsed.summary.unwrap_or_default(),
            episode_link: None,
            duration_seconds: segments
                .last()
                .map(|s| s.end_time.floor() as u64)
                .unwrap_or(0),
            source_file: filename.to_string(),
        };

        info!("Extracted metadata for {:?}: {}", filename, metadata.title);
        Ok(metadata)
    }
}
