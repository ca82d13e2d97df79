//! Mailbox access.
//!
//! The pipeline only sees [`MailboxPort`]. Two ports ship with the crate:
//! [`EmlDirectory`] reads a folder of `.eml` files, and [`MemoryMailbox`]
//! holds messages in memory with injectable failures for tests.

mod eml_dir;
mod memory;
mod port;

pub use eml_dir::EmlDirectory;
pub use memory::MemoryMailbox;
pub use port::{CandidateId, MailboxPort, PortError};

use chrono::NaiveDate;
use struk_mime::charset::{DEFAULT_CASCADE, decode_cascade};
use struk_mime::{Headers, split_header_block};

use crate::decoder::parse_date;

/// The header facts a sender/date search looks at.
#[derive(Debug)]
struct SearchView {
    from: String,
    date: Option<NaiveDate>,
}

impl SearchView {
    fn from_raw(raw: &[u8]) -> Self {
        let (header_block, _) = split_header_block(raw);
        let headers = Headers::parse(&decode_cascade(header_block, &DEFAULT_CASCADE));
        Self {
            from: headers.get("from").unwrap_or_default().to_lowercase(),
            date: headers
                .get("date")
                .and_then(parse_date)
                .map(|date| date.date_naive()),
        }
    }

    /// IMAP `FROM <sender> SINCE <date>` semantics. `fallback_date` stands
    /// in for the server's internal date when the header has none.
    fn matches(&self, sender: &str, since: NaiveDate, fallback_date: Option<NaiveDate>) -> bool {
        self.from.contains(&sender.to_lowercase())
            && self.date.or(fallback_date).is_some_and(|date| date >= since)
    }
}

/// Returns the requested header fields of a raw message as a header block.
fn header_fields(raw: &[u8], fields: &[&str]) -> Vec<u8> {
    let (header_block, _) = split_header_block(raw);
    struk_mime::extract_fields(&decode_cascade(header_block, &DEFAULT_CASCADE), fields)
        .into_bytes()
}
