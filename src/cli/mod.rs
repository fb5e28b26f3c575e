//! CLI module for Gjest.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Gjest - Podcast Transcript Ingestion
///
/// A CLI tool that ingests timed caption files into a searchable,
/// speaker-attributed index. The name "Gjest" comes from the Norwegian
/// word for "guest."
#[derive(Parser, Debug)]
#[command(name = "gjest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Gjest and write the default configuration
    Init,

    /// Ingest a caption file, or every caption file in a directory
    Ingest {
        /// Path to a caption file or a directory of caption files
        path: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
