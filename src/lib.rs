//! Gjest - Podcast Transcript Ingestion
//!
//! A CLI tool that turns timed caption files into retrievable,
//! speaker-attributed, topic-tagged passages in a search index.
//!
//! The name "Gjest" comes from the Norwegian word for "guest."
//!
//! # Overview
//!
//! Gjest allows you to:
//! - Parse WebVTT caption files and merge fragmentary cues into sentences
//! - Attribute each passage to a host or guest using LLM inference
//! - Extract episode metadata (title, guests, industry, topics, summary)
//! - Chunk transcripts into overlapping windows for retrieval
//! - Upsert episodes and chunks into a search index, idempotently
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt management
//! - `captions` - Caption parsing and cue merging
//! - `inference` - LLM inference abstraction
//! - `speakers` - Speaker attribution
//! - `metadata` - Episode metadata extraction
//! - `chunking` - Overlapping-window chunking
//! - `index` - Document index abstraction
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use gjest::config::Settings;
//! use gjest::orchestrator::Orchestrator;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let result = orchestrator.ingest_file(Path::new("episode.vtt")).await?;
//!     println!("Indexed {} chunks", result.chunks_created);
//!
//!     Ok(())
//! }
//! ```

pub mod captions;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod inference;
pub mod metadata;
pub mod openai;
pub mod orchestrator;
pub mod retry;
pub mod speakers;

pub use error::{GjestError, Result};
