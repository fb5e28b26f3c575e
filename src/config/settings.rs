//! Configuration settings for Gjest.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub ingestion: IngestionSettings,
    pub labeling: LabelingSettings,
    pub metadata: MetadataSettings,
    pub index: IndexSettings,
    pub retry: RetrySettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.gjest".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Caption ingestion and chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionSettings {
    /// File extension for caption files (without the dot).
    pub caption_extension: String,
    /// Target chunk size in words.
    pub chunk_size: usize,
    /// Word overlap carried between consecutive chunks.
    pub overlap: usize,
    /// Words from the start of the transcript passed to metadata extraction.
    pub intro_words: usize,
    /// Words from the end of the transcript passed to metadata extraction.
    pub outro_words: usize,
}

impl Default for IngestionSettings {
    fn default() -> Self {
        Self {
            caption_extension: "vtt".to_string(),
            chunk_size: 500,
            overlap: 50,
            intro_words: 2000,
            outro_words: 500,
        }
    }
}

/// Speaker labeling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelingSettings {
    /// LLM model for speaker attribution.
    pub model: String,
    /// Segments per inference call.
    pub batch_size: usize,
    /// Maximum concurrent batch inference calls.
    pub max_concurrent_batches: usize,
    /// Name of the show, given to the model as context.
    pub podcast_name: String,
    /// Known host names.
    pub hosts: Vec<String>,
}

impl Default for LabelingSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            batch_size: 20,
            max_concurrent_batches: 2,
            podcast_name: "The Bliss Business Podcast".to_string(),
            hosts: vec!["Steven Sikash".to_string(), "Mike Liske".to_string()],
        }
    }
}

/// Metadata extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataSettings {
    /// LLM model for metadata extraction.
    pub model: String,
}

impl Default for MetadataSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Document index (Typesense) connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub host: String,
    pub port: u16,
    pub protocol: String,
    /// API key. Falls back to the TYPESENSE_API_KEY environment variable.
    pub api_key: Option<String>,
    /// Collection holding one document per episode.
    pub episodes_collection: String,
    /// Collection holding one document per transcript chunk.
    pub chunks_collection: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8108,
            protocol: "http".to_string(),
            api_key: None,
            episodes_collection: "episodes".to_string(),
            chunks_collection: "transcript_chunks".to_string(),
        }
    }
}

impl IndexSettings {
    /// Base URL for the index HTTP API.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> String {
        self.api_key
            .clone()
            .or_else(|| std::env::var("TYPESENSE_API_KEY").ok())
            .unwrap_or_default()
    }
}

/// Retry policy settings for external calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::GjestError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gjest")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }
}
