//! Binary crate for the `shouldideploy` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - The interactive terminal UI (timezone picker, spinner)
//! - Human-friendly output formatting

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod render;
mod tui;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cmd = cli::Cli::parse_normalized();
    init_tracing(cmd.verbose);
    cmd.run().await
}
