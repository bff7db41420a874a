//! posit8-xcheck
//!
//! Command-line entry point for the cross-validation harness.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use posit8_xcheck::cli::Cli;
use posit8_xcheck::commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "debug"
    } else {
        "info,posit8_xcheck=debug"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    if let Err(e) = commands::execute(cli.config.as_deref(), cli.command).await {
        tracing::error!("Command failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}
