//! CLI command implementations.

mod config;
mod ingest;
mod init;

pub use config::run_config;
pub use ingest::run_ingest;
pub use init::run_init;
