//! Logbook CLI binary.

use anyhow::Result;
use logbook::cli::{self, Cli};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Main entry point for the logbook CLI.
///
/// Uses tokio's current_thread runtime: every command is a short sequence of
/// file reads followed by at most one append.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Can be controlled via RUST_LOG environment variable
    // Example: RUST_LOG=logbook=debug,logbook_jsonl=trace cargo run
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("logbook=info,logbook_jsonl=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting logbook CLI");

    let cli = Cli::parse_args();
    match cli.execute().await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<logbook::error::Error>() {
            Some(e) => {
                cli::report_error(e, cli.json);
                Ok(ExitCode::from(cli::exit_code(e.category())))
            }
            None => Err(err),
        },
    }
}
