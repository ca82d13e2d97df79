//! An in-memory mailbox for tests and dry runs.

use std::collections::HashSet;

use chrono::NaiveDate;

use super::{CandidateId, MailboxPort, PortError, SearchView, header_fields};

/// Mailbox holding raw messages in memory.
///
/// Ids are 1-based sequence numbers in insertion order, like IMAP message
/// sequence numbers. Failures can be injected per sender, per id, or for
/// the whole session, and every call is counted.
#[derive(Debug, Default, Clone)]
pub struct MemoryMailbox {
    messages: Vec<Vec<u8>>,
    failing_senders: HashSet<String>,
    failing_ids: HashSet<CandidateId>,
    disconnected: bool,
    /// Number of `search` calls made.
    pub searches: usize,
    /// Number of `fetch_header` calls made.
    pub header_fetches: usize,
    /// Number of `fetch_full` calls made.
    pub full_fetches: usize,
}

impl MemoryMailbox {
    /// Creates an empty mailbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw message and returns its id.
    pub fn push(&mut self, raw: impl Into<Vec<u8>>) -> CandidateId {
        self.messages.push(raw.into());
        CandidateId::new(self.messages.len().to_string())
    }

    /// Makes searches for `sender` fail with a recoverable error.
    pub fn fail_search_for(&mut self, sender: impl Into<String>) {
        self.failing_senders.insert(sender.into());
    }

    /// Makes fetches of `id` fail with a recoverable error.
    pub fn fail_fetch_for(&mut self, id: CandidateId) {
        self.failing_ids.insert(id);
    }

    /// Makes every subsequent call fail with a connection error.
    pub const fn disconnect(&mut self) {
        self.disconnected = true;
    }

    fn check_connected(&self) -> Result<(), PortError> {
        if self.disconnected {
            Err(PortError::Connection("connection reset by peer".to_string()))
        } else {
            Ok(())
        }
    }

    fn message(&self, id: &CandidateId) -> Result<&[u8], PortError> {
        self.check_connected()?;
        if self.failing_ids.contains(id) {
            return Err(PortError::Operation(format!("FETCH {id} failed")));
        }
        id.as_str()
            .parse::<usize>()
            .ok()
            .and_then(|seq| seq.checked_sub(1))
            .and_then(|index| self.messages.get(index))
            .map(Vec::as_slice)
            .ok_or_else(|| PortError::NotFound(id.clone()))
    }
}

impl MailboxPort for MemoryMailbox {
    async fn search(
        &mut self,
        sender: &str,
        since: NaiveDate,
    ) -> Result<Vec<CandidateId>, PortError> {
        self.searches += 1;
        self.check_connected()?;
        if self.failing_senders.contains(sender) {
            return Err(PortError::Operation(format!("SEARCH FROM {sender} failed")));
        }

        Ok(self
            .messages
            .iter()
            .enumerate()
            .filter(|(_, raw)| SearchView::from_raw(raw).matches(sender, since, None))
            .map(|(index, _)| CandidateId::new((index + 1).to_string()))
            .collect())
    }

    async fn fetch_header(
        &mut self,
        id: &CandidateId,
        fields: &[&str],
    ) -> Result<Vec<u8>, PortError> {
        self.header_fetches += 1;
        Ok(header_fields(self.message(id)?, fields))
    }

    async fn fetch_full(&mut self, id: &CandidateId) -> Result<Vec<u8>, PortError> {
        self.full_fetches += 1;
        self.message(id).map(<[u8]>::to_vec)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const RECEIPT: &str =
        "From: noreply@grab.com\r\nDate: Wed, 10 Jan 2024 12:00:00 +0000\r\nSubject: Your Grab E-Receipt\r\n\r\nTotal: Rp 20.000";

    fn since() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_push_and_fetch() {
        let mut mailbox = MemoryMailbox::new();
        let id = mailbox.push(RECEIPT);
        assert_eq!(id.as_str(), "1");
        assert_eq!(mailbox.fetch_full(&id).await.unwrap(), RECEIPT.as_bytes());
        assert_eq!(
            mailbox.fetch_header(&id, &["subject"]).await.unwrap(),
            b"Subject: Your Grab E-Receipt\r\n\r\n"
        );
        assert_eq!(mailbox.full_fetches, 1);
        assert_eq!(mailbox.header_fetches, 1);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let mut mailbox = MemoryMailbox::new();
        mailbox.push(RECEIPT);
        for id in ["0", "2", "x"] {
            let err = mailbox.fetch_full(&CandidateId::new(id)).await.unwrap_err();
            assert!(matches!(err, PortError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let mut mailbox = MemoryMailbox::new();
        let id = mailbox.push(RECEIPT);
        mailbox.fail_search_for("grab.com");
        mailbox.fail_fetch_for(id.clone());

        let err = mailbox.search("grab.com", since()).await.unwrap_err();
        assert!(!err.is_fatal());
        let err = mailbox.fetch_full(&id).await.unwrap_err();
        assert!(!err.is_fatal());

        mailbox.disconnect();
        let err = mailbox.search("ovo.id", since()).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(mailbox.searches, 2);
    }

    #[tokio::test]
    async fn test_search() {
        let mut mailbox = MemoryMailbox::new();
        mailbox.push(RECEIPT);
        mailbox.push("From: a@ovo.id\r\nDate: Wed, 10 Jan 2024 12:00:00 +0000\r\n\r\n");
        let ids = mailbox.search("grab.com", since()).await.unwrap();
        assert_eq!(ids, vec![CandidateId::new("1")]);
    }
}
