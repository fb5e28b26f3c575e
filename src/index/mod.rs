//! Document index abstraction.
//!
//! Provides a trait-based interface over a search index with two logical
//! collections: one episode document per caption file and one document per
//! transcript chunk. All writes are upserts keyed by deterministic ids,
//! which makes re-ingestion idempotent at the episode granularity.

mod memory;
mod typesense;

pub use memory::MemoryIndex;
pub use typesense::TypesenseIndex;

use crate::chunking::TranscriptChunk;
use crate::error::Result;
use crate::metadata::EpisodeMetadata;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The per-episode document, keyed by episode id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeDocument {
    pub id: String,
    pub title: String,
    pub guest_names: Vec<String>,
    pub host_names: Vec<String>,
    pub industry: String,
    pub topic_tags: Vec<String>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_link: Option<String>,
    pub duration_seconds: u64,
    /// Raw caption filename this episode was ingested from.
    pub source_file: String,
    /// When this document was (last) indexed.
    pub indexed_at: DateTime<Utc>,
}

impl EpisodeDocument {
    /// Flatten episode metadata into an index document.
    pub fn from_metadata(episode_id: &str, metadata: &EpisodeMetadata) -> Self {
        Self {
            id: episode_id.to_string(),
            title: metadata.title.clone(),
            guest_names: metadata.guest_names.clone(),
            host_names: metadata.host_names.clone(),
            industry: metadata.industry.clone(),
            topic_tags: metadata.topic_tags.clone(),
            summary: metadata.summary.clone(),
            episode_link: metadata.episode_link.clone(),
            duration_seconds: metadata.duration_seconds,
            source_file: metadata.source_file.clone(),
            indexed_at: Utc::now(),
        }
    }
}

/// The per-chunk document, keyed by `{episode_id}_chunk_{chunk_index}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkDocument {
    pub id: String,
    pub episode_id: String,
    pub text: String,
    pub speaker: String,
    pub start_time: f64,
    pub end_time: f64,
    pub chunk_index: usize,
    pub guest_names: Vec<String>,
    pub industry: String,
    pub topic_tags: Vec<String>,
    /// When this document was (last) indexed.
    pub indexed_at: DateTime<Utc>,
}

impl From<&TranscriptChunk> for ChunkDocument {
    fn from(chunk: &TranscriptChunk) -> Self {
        Self {
            id: format!("{}_chunk_{}", chunk.episode_id, chunk.chunk_index),
            episode_id: chunk.episode_id.clone(),
            text: chunk.text.clone(),
            speaker: chunk.speaker.clone(),
            start_time: chunk.start_time,
            end_time: chunk.end_time,
            chunk_index: chunk.chunk_index,
            guest_names: chunk.guest_names.clone(),
            industry: chunk.industry.clone(),
            topic_tags: chunk.topic_tags.clone(),
            indexed_at: Utc::now(),
        }
    }
}

/// Trait for document index implementations.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Upsert the episode document by episode id.
    async fn upsert_episode(&self, doc: &EpisodeDocument) -> Result<()>;

    /// Upsert one chunk document by chunk id.
    async fn upsert_chunk(&self, doc: &ChunkDocument) -> Result<()>;

    /// Upsert a batch of chunk documents; returns the number written.
    async fn upsert_chunks(&self, docs: &[ChunkDocument]) -> Result<usize> {
        for doc in docs {
            self.upsert_chunk(doc).await?;
        }
        Ok(docs.len())
    }
}
