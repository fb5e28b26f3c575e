//! Pipeline orchestrator for Gjest.
//!
//! Coordinates the entire ingestion flow for a caption file:
//! parse cues → merge segments → extract metadata → label speakers →
//! chunk → upsert episode and chunk documents to the index.

use crate::captions::{merge_cues, parse_vtt};
use crate::chunking::{chunk_segments, ChunkingConfig};
use crate::config::{Prompts, Settings};
use crate::error::{GjestError, Result};
use crate::index::{ChunkDocument, DocumentIndex, EpisodeDocument, TypesenseIndex};
use crate::inference::{ChatModel, OpenAiChat};
use crate::metadata::{parse_filename, MetadataExtractor};
use crate::retry::RetryPolicy;
use crate::speakers::SpeakerLabeler;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the Gjest ingestion pipeline.
pub struct Orchestrator {
    settings: Settings,
    labeler: SpeakerLabeler,
    extractor: MetadataExtractor,
    index: Arc<dyn DocumentIndex>,
}

impl Orchestrator {
    /// Create a new orchestrator with default components.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let retry = RetryPolicy::new(
            settings.retry.max_retries,
            settings.retry.initial_backoff_ms,
            settings.retry.max_backoff_ms,
        );

        let labeling_model: Arc<dyn ChatModel> =
            Arc::new(OpenAiChat::new(&settings.labeling.model, retry.clone()));
        let metadata_model: Arc<dyn ChatModel> =
            Arc::new(OpenAiChat::new(&settings.metadata.model, retry.clone()));
        let index: Arc<dyn DocumentIndex> = Arc::new(TypesenseIndex::new(&settings.index, retry)?);

        Ok(Self::assemble(
            settings,
            prompts,
            labeling_model,
            metadata_model,
            index,
        ))
    }

    /// Create an orchestrator with custom components (testing, alternative backends).
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        model: Arc<dyn ChatModel>,
        index: Arc<dyn DocumentIndex>,
    ) -> Self {
        Self::assemble(settings, prompts, model.clone(), model, index)
    }

    fn assemble(
        settings: Settings,
        prompts: Prompts,
        labeling_model: Arc<dyn ChatModel>,
        metadata_model: Arc<dyn ChatModel>,
        index: Arc<dyn DocumentIndex>,
    ) -> Self {
        let labeler = SpeakerLabeler::new(labeling_model, prompts.clone(), &settings.labeling);
        let extractor = MetadataExtractor::new(
            metadata_model,
            prompts,
            settings.labeling.hosts.clone(),
            &settings.ingestion,
        );

        Self {
            settings,
            labeler,
            extractor,
            index,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the full ingestion pipeline for a single caption file.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn ingest_file(&self, path: &Path) -> Result<IngestResult> {
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                GjestError::InvalidInput(format!("not a valid file path: {}", path.display()))
            })?
            .to_string();

        info!("Starting ingestion for {:?}", filename);

        // 1. Parse captions and merge cues into segments
        let cues = parse_vtt(path)?;
        let segments = merge_cues(&cues);
        info!("Parsed {} merged segments", segments.len());

        // 2. Extract metadata (includes guest name from filename)
        let metadata = self.extractor.extract(&filename, &segments).await?;

        // 3. Label speakers; fall back to the filename-derived guest when
        //    the extracted metadata carries no guest names
        let guest_name = metadata
            .guest_names
            .first()
            .cloned()
            .unwrap_or_else(|| parse_filename(&filename).guest_name);
        let labeled = self.labeler.label(&segments, &guest_name).await?;
        info!("Labeled {} segments with speakers", labeled.len());

        // 4. Chunk
        let episode_id = episode_id_from_filename(&filename);
        let config = ChunkingConfig {
            chunk_size: self.settings.ingestion.chunk_size,
            overlap: self.settings.ingestion.overlap,
        };
        let chunks = chunk_segments(&labeled, &episode_id, &metadata, &config);
        info!("Created {} chunks", chunks.len());

        // 5. Upsert episode and chunk documents
        let episode_doc = EpisodeDocument::from_metadata(&episode_id, &metadata);
        self.index.upsert_episode(&episode_doc).await?;

        let chunk_docs: Vec<ChunkDocument> = chunks.iter().map(ChunkDocument::from).collect();
        let chunks_created = self.index.upsert_chunks(&chunk_docs).await?;

        info!("Upserted episode {:?} with {} chunks", episode_id, chunks_created);

        Ok(IngestResult {
            episode_id,
            chunks_created,
        })
    }

    /// Ingest all caption files in a directory (no recursion).
    ///
    /// Best-effort: a failing file is logged and recorded, and never
    /// aborts its siblings.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub async fn ingest_directory(&self, dir: &Path) -> Result<DirectoryResult> {
        let extension = self.settings.ingestion.caption_extension.as_str();

        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file() && p.extension().and_then(|e| e.to_str()) == Some(extension)
            })
            .collect();
        files.sort();

        info!("Found {} caption files in {}", files.len(), dir.display());

        let mut episodes_processed = 0;
        let mut failures = Vec::new();

        for file in &files {
            match self.ingest_file(file).await {
                Ok(result) => {
                    episodes_processed += 1;
                    info!(
                        "Ingested {:?} ({} chunks)",
                        result.episode_id, result.chunks_created
                    );
                }
                Err(e) => {
                    warn!("Failed to ingest {}: {}", file.display(), e);
                    failures.push(FileFailure {
                        file: file.display().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(DirectoryResult {
            episodes_processed,
            failures,
        })
    }
}

/// Derive the stable episode id from a caption filename:
/// extension stripped, spaces replaced with underscores, lowercased.
pub fn episode_id_from_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    stem.replace(' ', "_").to_lowercase()
}

/// Result of ingesting a single caption file.
#[derive(Debug, Serialize)]
pub struct IngestResult {
    /// Stable episode id derived from the filename.
    pub episode_id: String,
    /// Number of chunk documents written.
    pub chunks_created: usize,
}

/// Result of ingesting a directory.
#[derive(Debug, Serialize)]
pub struct DirectoryResult {
    /// Number of files ingested successfully.
    pub episodes_processed: usize,
    /// Files that failed, with their error messages.
    pub failures: Vec<FileFailure>,
}

/// A single file's ingestion failure.
#[derive(Debug, Serialize)]
pub struct FileFailure {
    pub file: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Model that replays scripted responses and records user prompts.
    struct RecordingModel {
        responses: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingModel {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(String::from).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn complete(&self, _system: &str, user: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(user.to_string());
            let mut responses = self.responses.lock().unwrap();
            Ok(responses.pop_front().unwrap_or_else(|| "[]".to_string()))
        }
    }

    fn write_vtt(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    const SIMPLE_VTT: &str =
        "WEBVTT\n\n00:00:00.000 --> 00:00:02.000\nWelcome to the show.\n\n00:00:02.000 --> 00:00:04.000\nThanks for having me.\n";

    fn orchestrator(
        model: Arc<RecordingModel>,
        index: Arc<MemoryIndex>,
    ) -> Orchestrator {
        Orchestrator::with_components(
            Settings::default(),
            Prompts::default(),
            model,
            index,
        )
    }

    #[test]
    fn test_episode_id_from_filename() {
        assert_eq!(
            episode_id_from_filename("Great Episode with John Smith _unedited_.vtt"),
            "great_episode_with_john_smith__unedited_"
        );
        assert_eq!(episode_id_from_filename("Plain.vtt"), "plain");
    }

    #[tokio::test]
    async fn test_ingest_file_writes_episode_and_chunks() {
        let model = Arc::new(RecordingModel::new(vec![
            r#"{"title": "Great Episode", "guest_names": ["John Smith"]}"#,
            r#"[{"index": 0, "speaker": "Steven Sikash", "confidence": 0.9}]"#,
        ]));
        let index = Arc::new(MemoryIndex::new());
        let orch = orchestrator(model, index.clone());

        let dir = tempfile::tempdir().unwrap();
        let path = write_vtt(dir.path(), "Great Episode with John Smith.vtt", SIMPLE_VTT);

        let result = orch.ingest_file(&path).await.unwrap();
        assert_eq!(result.episode_id, "great_episode_with_john_smith");
        assert_eq!(result.chunks_created, 1);

        assert_eq!(index.episode_count(), 1);
        assert_eq!(index.chunk_count(), 1);

        let episode = index.get_episode("great_episode_with_john_smith").unwrap();
        assert_eq!(episode.title, "Great Episode");
        assert_eq!(episode.source_file, "Great Episode with John Smith.vtt");

        let chunk = index
            .get_chunk("great_episode_with_john_smith_chunk_0")
            .unwrap();
        assert_eq!(chunk.chunk_index, 0);
        assert_eq!(chunk.guest_names, vec!["John Smith".to_string()]);
    }

    #[tokio::test]
    async fn test_reingestion_is_idempotent() {
        let index = Arc::new(MemoryIndex::new());
        let dir = tempfile::tempdir().unwrap();
        let path = write_vtt(dir.path(), "Repeat Episode.vtt", SIMPLE_VTT);

        let model = Arc::new(RecordingModel::new(vec![]));
        let orch = orchestrator(model, index.clone());

        let first = orch.ingest_file(&path).await.unwrap();
        let ids_after_first = index.chunk_ids();

        let second = orch.ingest_file(&path).await.unwrap();

        assert_eq!(first.episode_id, second.episode_id);
        assert_eq!(first.chunks_created, second.chunks_created);
        assert_eq!(index.chunk_ids(), ids_after_first);
        assert_eq!(index.episode_count(), 1);
    }

    #[tokio::test]
    async fn test_guest_fallback_to_filename_when_metadata_empty() {
        // Metadata response explicitly reports no guests; the labeler must
        // still receive the filename-derived guest.
        let model = Arc::new(RecordingModel::new(vec![
            r#"{"title": "Great Episode", "guest_names": []}"#,
            "[]",
        ]));
        let index = Arc::new(MemoryIndex::new());
        let orch = orchestrator(model.clone(), index);

        let dir = tempfile::tempdir().unwrap();
        let path = write_vtt(dir.path(), "Great Episode with John Smith.vtt", SIMPLE_VTT);

        orch.ingest_file(&path).await.unwrap();

        let prompts = model.prompts();
        // First call is metadata extraction, second is speaker labeling.
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("Guest: John Smith"));
    }

    #[tokio::test]
    async fn test_ingest_missing_file_fails() {
        let model = Arc::new(RecordingModel::new(vec![]));
        let index = Arc::new(MemoryIndex::new());
        let orch = orchestrator(model, index);

        let result = orch.ingest_file(Path::new("/nonexistent/episode.vtt")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_directory_ingestion_is_best_effort() {
        let index = Arc::new(MemoryIndex::new());
        let model = Arc::new(RecordingModel::new(vec![]));
        let orch = orchestrator(model, index.clone());

        let dir = tempfile::tempdir().unwrap();
        write_vtt(dir.path(), "Good Episode.vtt", SIMPLE_VTT);
        write_vtt(
            dir.path(),
            "Bad Episode.vtt",
            "WEBVTT\n\n00:00:xx.000 --> 00:00:01.000\nbroken\n",
        );
        // Non-caption files are ignored entirely.
        std::fs::write(dir.path().join("notes.txt"), "not captions").unwrap();

        let result = orch.ingest_directory(dir.path()).await.unwrap();
        assert_eq!(result.episodes_processed, 1);
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].file.contains("Bad Episode.vtt"));

        assert_eq!(index.episode_count(), 1);
        assert!(index.get_episode("good_episode").is_some());
    }

    #[tokio::test]
    async fn test_directory_of_empty_dir() {
        let index = Arc::new(MemoryIndex::new());
        let model = Arc::new(RecordingModel::new(vec![]));
        let orch = orchestrator(model, index);

        let dir = tempfile::tempdir().unwrap();
        let result = orch.ingest_directory(dir.path()).await.unwrap();
        assert_eq!(result.episodes_processed, 0);
        assert!(result.failures.is_empty());
    }
}
