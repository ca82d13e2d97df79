//! Struk CLI - receipt email total extractor
//!
//! Usage:
//!   struk scan --mailbox DIR          Select, decode and export receipts
//!   struk inspect FILE.eml [--json]   Decode one message

mod cli;
mod commands;
mod display;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("struk=info,struk_core=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Scan(args) => commands::cmd_scan(&args).await,
        Commands::Inspect { file, json } => commands::cmd_inspect(&file, json).await,
    }
}
