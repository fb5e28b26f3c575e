//! Ingest command: run the pipeline over a file or directory.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::{GjestError, Result};
use crate::orchestrator::Orchestrator;
use std::path::Path;

/// Run ingestion for a caption file or a directory of caption files.
pub async fn run_ingest(path: &str, settings: Settings) -> Result<()> {
    let target = Path::new(path);
    if !target.exists() {
        return Err(GjestError::InvalidInput(format!(
            "path does not exist: {}",
            path
        )));
    }

    let orchestrator = Orchestrator::new(settings)?;

    if target.is_dir() {
        Output::info(&format!("Ingesting caption files from {}", path));

        let result = orchestrator.ingest_directory(target).await?;

        for failure in &result.failures {
            Output::warning(&format!("{}: {}", failure.file, failure.error));
        }
        Output::success(&format!(
            "Processed {} episodes ({} failed)",
            result.episodes_processed,
            result.failures.len()
        ));
    } else {
        let spinner = Output::spinner(&format!("Ingesting {}", path));
        let result = orchestrator.ingest_file(target).await;
        spinner.finish_and_clear();

        let result = result?;
        Output::success(&format!(
            "Indexed episode {} ({} chunks)",
            result.episode_id, result.chunks_created
        ));
    }

    Ok(())
}
