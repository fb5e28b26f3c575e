//! Typesense-backed document index.
//!
//! Talks to the Typesense HTTP API directly: one upsert-by-id call per
//! document. Transient failures are retried with bounded backoff; once
//! retries exhaust the write error is fatal for the ingestion.

use super::{ChunkDocument, DocumentIndex, EpisodeDocument};
use crate::config::IndexSettings;
use crate::error::{GjestError, Result};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Connection timeout for index requests.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Typesense document index client.
pub struct TypesenseIndex {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    episodes_collection: String,
    chunks_collection: String,
    retry: RetryPolicy,
}

impl TypesenseIndex {
    /// Create a client from index settings.
    pub fn new(settings: &IndexSettings, retry: RetryPolicy) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url(),
            api_key: settings.resolve_api_key(),
            episodes_collection: settings.episodes_collection.clone(),
            chunks_collection: settings.chunks_collection.clone(),
            retry,
        })
    }

    /// Upsert one document into a collection, retrying on failure.
    async fn upsert(&self, collection: &str, document: &serde_json::Value) -> Result<()> {
        let url = format!(
            "{}/collections/{}/documents?action=upsert",
            self.base_url, collection
        );

        self.retry
            .run("index_upsert", || async {
                let response = self
                    .http
                    .post(&url)
                    .header("X-TYPESENSE-API-KEY", &self.api_key)
                    .json(document)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(GjestError::Index(format!(
                        "upsert to {:?} failed: {} {}",
                        collection, status, body
                    )));
                }

                debug!(collection, "upserted document");
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl DocumentIndex for TypesenseIndex {
    async fn upsert_episode(&self, doc: &EpisodeDocument) -> Result<()> {
        let body = serde_json::to_value(doc)?;
        self.upsert(&self.episodes_collection, &body).await
    }

    async fn upsert_chunk(&self, doc: &ChunkDocument) -> Result<()> {
        let body = serde_json::to_value(doc)?;
        self.upsert(&self.chunks_collection, &body).await
    }
}
