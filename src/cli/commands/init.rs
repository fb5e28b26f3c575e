//! Init command: first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;

/// Initialize Gjest: create the data directory and write the default
/// configuration file if none exists.
pub fn run_init(settings: &Settings) -> Result<()> {
    Output::header("Initializing Gjest");

    std::fs::create_dir_all(settings.data_dir())?;
    Output::kv("Data directory", &settings.data_dir().display().to_string());

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!(
            "Configuration already exists at {}",
            config_path.display()
        ));
    } else {
        settings.save()?;
        Output::success(&format!("Wrote configuration to {}", config_path.display()));
    }

    Output::kv("Index", &settings.index.base_url());
    Output::kv("Podcast", &settings.labeling.podcast_name);
    Output::kv("Hosts", &settings.labeling.hosts.join(", "));

    if settings.index.resolve_api_key().is_empty() {
        Output::warning("No index API key configured (set [index].api_key or TYPESENSE_API_KEY)");
    }
    if std::env::var("OPENAI_API_KEY").is_err() {
        Output::warning("OPENAI_API_KEY is not set; speaker labeling and metadata extraction will fail");
    }

    Ok(())
}
