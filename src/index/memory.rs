//! In-memory document index implementation.
//!
//! Useful for testing; mirrors the upsert-by-id semantics of the real index.

use super::{ChunkDocument, DocumentIndex, EpisodeDocument};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory document index.
#[derive(Default)]
pub struct MemoryIndex {
    episodes: RwLock<HashMap<String, EpisodeDocument>>,
    chunks: RwLock<HashMap<String, ChunkDocument>>,
}

impl MemoryIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn episode_count(&self) -> usize {
        self.episodes.read().unwrap().len()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.read().unwrap().len()
    }

    pub fn get_episode(&self, id: &str) -> Option<EpisodeDocument> {
        self.episodes.read().unwrap().get(id).cloned()
    }

    pub fn get_chunk(&self, id: &str) -> Option<ChunkDocument> {
        self.chunks.read().unwrap().get(id).cloned()
    }

    /// All chunk ids, sorted.
    pub fn chunk_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.chunks.read().unwrap().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl DocumentIndex for MemoryIndex {
    async fn upsert_episode(&self, doc: &EpisodeDocument) -> Result<()> {
        let mut episodes = self.episodes.write().unwrap();
        episodes.insert(doc.id.clone(), doc.clone());
        Ok(())
    }

    async fn upsert_chunk(&self, doc: &ChunkDocument) -> Result<()> {
        let mut chunks = self.chunks.write().unwrap();
        chunks.insert(doc.id.clone(), doc.clone());
        Ok(())
    }
}
