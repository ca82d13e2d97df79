//! Error types for the core library.

use thiserror::Error;

use crate::mailbox::PortError;
use crate::receipt::SinkError;

/// Errors that can occur in core operations.
///
/// Only failures that end a whole run surface here. Per-domain search
/// failures and per-message fetch failures are logged and skipped by the
/// filter and the assembler.
#[derive(Debug, Error)]
pub enum Error {
    /// Mailbox connection or authentication failed.
    #[error("Mailbox error: {0}")]
    Mailbox(#[from] PortError),

    /// Writing records failed.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// A subject pattern is not a valid regular expression.
    #[error("Invalid subject pattern {pattern:?}: {source}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// The compile error.
        source: regex::Error,
    },

    /// Configuration file could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
