//! Turns candidate ids into receipt records, one message at a time.

use tracing::{debug, info, warn};

use super::ReceiptRecord;
use crate::amount;
use crate::decoder;
use crate::error::Result;
use crate::mailbox::{CandidateId, MailboxPort};

/// Records built from one batch of candidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembly {
    /// Records in processing order.
    pub records: Vec<ReceiptRecord>,
    /// Ids whose fetch failed.
    pub skipped: Vec<CandidateId>,
}

/// Fetches, decodes and prices candidate messages.
///
/// The assembler never writes records anywhere; hand [`Assembly::records`]
/// to a [`RecordSink`](super::RecordSink).
#[derive(Debug, Clone, Copy, Default)]
pub struct ReceiptAssembler;

impl ReceiptAssembler {
    /// Creates an assembler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Processes one candidate.
    ///
    /// Returns `Ok(None)` when the message could not be fetched. A message
    /// without a recognizable total still yields a record, priced at `0.0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the port reports a connection or authentication
    /// failure.
    pub async fn process<P>(&self, port: &mut P, id: &CandidateId) -> Result<Option<ReceiptRecord>>
    where
        P: MailboxPort + Send,
    {
        let raw = match port.fetch_full(id).await {
            Ok(raw) => raw,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(%id, error = %e, "Fetch failed, skipping message");
                return Ok(None);
            }
        };

        let message = decoder::decode(&raw);
        let amount = amount::extract(&message.body_text);
        if amount.is_none() {
            debug!(%id, "No total found");
        }
        debug!(%id, subject = %message.subject, ?amount, "Processed message");

        Ok(Some(ReceiptRecord::new(message, amount)))
    }

    /// Processes every candidate in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the port reports a connection or authentication
    /// failure. Records assembled before the failure are discarded.
    pub async fn assemble<P>(&self, port: &mut P, ids: &[CandidateId]) -> Result<Assembly>
    where
        P: MailboxPort + Send,
    {
        let mut assembly = Assembly::default();

        for id in ids {
            match self.process(port, id).await? {
                Some(record) => assembly.records.push(record),
                None => assembly.skipped.push(id.clone()),
            }
        }

        info!(
            processed = assembly.records.len(),
            skipped = assembly.skipped.len(),
            "Assembly finished"
        );
        Ok(assembly)
    }
}
