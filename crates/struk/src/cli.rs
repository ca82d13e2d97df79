//! CLI argument definitions using clap
//!
//! The command implementations live in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Struk - pull transaction totals out of receipt emails
#[derive(Debug, Parser)]
#[command(name = "struk")]
#[command(about = "Extract transaction totals from e-wallet and e-commerce receipt emails", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a mailbox for receipts and append them to a CSV file
    Scan(ScanArgs),

    /// Decode a single message file and show what would be extracted
    Inspect {
        /// The .eml file to decode
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory of .eml files to scan
    #[arg(short, long)]
    pub mailbox: PathBuf,

    /// Filter config file (YAML)
    ///
    /// Without it, ./config/email_filters.yaml and then
    /// <config dir>/struk/email_filters.yaml are tried before the
    /// built-in defaults.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// CSV file to append records to
    #[arg(short, long, default_value = "receipts.csv")]
    pub output: PathBuf,

    /// Only consider messages from the last N days
    #[arg(long)]
    pub days: Option<u32>,

    /// Keep at most N candidates
    #[arg(long)]
    pub max: Option<usize>,

    /// Print records without writing the CSV file
    #[arg(long)]
    pub dry_run: bool,
}
