//! CLI entry point for seamless tile generation

use std::process::ExitCode;

use clap::Parser;
use seamtile::io::cli::{Cli, run};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(summary) if summary.failed == 0 => ExitCode::SUCCESS,
        Ok(summary) => {
            error!(failed = summary.failed, "Some variants failed");
            ExitCode::FAILURE
        }
        Err(error) => {
            error!(%error, "Generation aborted");
            ExitCode::FAILURE
        }
    }
}
