//! # struk-core
//!
//! Receipt extraction pipeline for e-commerce and e-wallet notification
//! mail.
//!
//! This crate provides:
//! - **Mailbox access** - The [`MailboxPort`] search/fetch capability, with
//!   an `.eml` directory port and an in-memory port
//! - **Candidate selection** - Sender and subject heuristics over a date
//!   window ([`CandidateFilter`])
//! - **Message decoding** - Sender, subject, date, id and readable body
//!   text from any MIME layout ([`decoder`])
//! - **Amount extraction** - Locale-free parsing of Rupiah totals
//!   ([`amount`])
//! - **Records** - Assembly into flat [`ReceiptRecord`]s and append-only
//!   CSV output
//!
//! The stages run strictly in sequence over one mailbox session:
//! filter, then fetch and decode, then extract, then persist.
//!
//! ```no_run
//! use struk_core::{
//!     CandidateFilter, CsvSink, EmlDirectory, FilterConfig, ReceiptAssembler, RecordSink,
//!     SystemClock,
//! };
//!
//! # async fn run() -> struk_core::Result<()> {
//! let mut mailbox = EmlDirectory::open("mail/inbox").await?;
//! let filter = CandidateFilter::new(FilterConfig::default())?;
//! let selection = filter.select(&mut mailbox, &SystemClock).await?;
//! let assembly = ReceiptAssembler::new().assemble(&mut mailbox, &selection.ids).await?;
//! CsvSink::new("receipts.csv").append(&assembly.records)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod amount;
pub mod decoder;
mod error;
pub mod filter;
pub mod mailbox;
pub mod receipt;
pub mod time;

pub use decoder::{DecodedMessage, Timestamp};
pub use error::{Error, Result};
pub use filter::{CandidateFilter, CandidateSelection, FilterConfig};
pub use mailbox::{CandidateId, EmlDirectory, MailboxPort, MemoryMailbox, PortError};
pub use receipt::{Assembly, CsvSink, ReceiptAssembler, ReceiptRecord, RecordSink, SinkError};
pub use time::{Clock, FixedClock, SystemClock};
