//! Configuration management for Gjest.

mod prompts;
mod settings;

pub use prompts::{MetadataPrompts, Prompts, SpeakerPrompts};
pub use settings::{
    GeneralSettings, IndexSettings, IngestionSettings, LabelingSettings, MetadataSettings,
    PromptSettings, RetrySettings, Settings,
};
