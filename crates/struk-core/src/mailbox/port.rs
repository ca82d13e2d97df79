//! The mailbox capability the pipeline consumes.

use std::fmt;
use std::future::Future;

use chrono::NaiveDate;

/// Opaque handle for one message within a mailbox session.
///
/// Only meaningful to the port that issued it, and only for the lifetime
/// of that port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId(String);

impl CandidateId {
    /// Wraps a port-specific identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as the port issued it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors a mailbox port can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// The mailbox could not be reached, or the session was lost.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The mailbox rejected the credentials.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A single search or fetch failed.
    #[error("Operation failed: {0}")]
    Operation(String),

    /// The id does not name a message in this session.
    #[error("Message not found: {0}")]
    NotFound(CandidateId),
}

impl PortError {
    /// Whether the error ends the whole run rather than one call.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Authentication(_))
    }
}

/// Read-only search and fetch access to one mailbox.
///
/// Calls are issued strictly one at a time. Implementations own their
/// connection and any timeouts; the pipeline never mutates mailbox state.
pub trait MailboxPort {
    /// Finds messages whose sender contains `sender` (case-insensitive) and
    /// whose date is on or after `since`.
    fn search(
        &mut self,
        sender: &str,
        since: NaiveDate,
    ) -> impl Future<Output = Result<Vec<CandidateId>, PortError>> + Send;

    /// Fetches only the named header fields, raw, as a header block.
    fn fetch_header(
        &mut self,
        id: &CandidateId,
        fields: &[&str],
    ) -> impl Future<Output = Result<Vec<u8>, PortError>> + Send;

    /// Fetches the complete raw message.
    fn fetch_full(
        &mut self,
        id: &CandidateId,
    ) -> impl Future<Output = Result<Vec<u8>, PortError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(PortError::Connection("reset".into()).is_fatal());
        assert!(PortError::Authentication("bad password".into()).is_fatal());
        assert!(!PortError::Operation("NO".into()).is_fatal());
        assert!(!PortError::NotFound(CandidateId::new("7")).is_fatal());
    }

    #[test]
    fn test_candidate_id_display() {
        let id = CandidateId::new("0001.eml");
        assert_eq!(id.to_string(), "0001.eml");
        assert_eq!(id.as_str(), "0001.eml");
    }
}
