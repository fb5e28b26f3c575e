//! Prompt templates for Gjest.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub speaker: SpeakerPrompts,
    pub metadata: MetadataPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for speaker attribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakerPrompts {
    pub system: String,
    pub user: String,
}

impl Default for SpeakerPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are analyzing a podcast transcript to identify who is speaking.

For each segment, assign the most likely speaker based on:
1. Contextual clues (introductions, name mentions)
2. Conversation flow (question/answer patterns - hosts tend to ask questions)
3. Content attribution (personal stories likely belong to the guest)

Return ONLY a JSON array, no other text. Each element has:
- "index": the segment index (0-based)
- "speaker": the speaker name, using the exact names you were given
- "confidence": float 0-1"#
                .to_string(),

            user: r#"Known information:
- Podcast: "{{podcast_name}}"
- Hosts: {{hosts}}
- Guest: {{guest_name}}

Transcript segments:
{{segments}}

Return ONLY the JSON array, no other text."#
                .to_string(),
        }
    }
}

/// Prompts for episode metadata extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataPrompts {
    pub system: String,
    pub user: String,
}

impl Default for MetadataPrompts {
    fn default() -> Self {
        Self {
            system: r#"You analyze podcast transcript excerpts and extract structured episode metadata.

Return ONLY a JSON object, no other text, with:
- "title": episode title (use the parsed title if it's good, or improve it)
- "guest_names": array of guest names mentioned
- "host_names": array of host names mentioned
- "industry": the guest's industry/business category (single string)
- "topic_tags": array of 3-5 topic tags discussed in the episode
- "summary": 2-3 sentence summary of the episode"#
                .to_string(),

            user: r#"Filename: {{filename}}
Parsed title: {{title}}
Parsed guest: {{guest_name}}

Transcript (first ~{{intro_words}} words):
{{intro_text}}

Transcript (last ~{{outro_words}} words):
{{outro_text}}

Return ONLY the JSON object, no other text."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let speaker_path = custom_path.join("speaker.toml");
            if speaker_path.exists() {
                let content = std::fs::read_to_string(&speaker_path)?;
                prompts.speaker = toml::from_str(&content)?;
            }

            let metadata_path = custom_path.join("metadata.toml");
            if metadata_path.exists() {
                let content = std::fs::read_to_string(&metadata_path)?;
                prompts.metadata = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
