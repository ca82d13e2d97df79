//! # struk-mime
//!
//! Lenient MIME message parsing for machine-generated notification mail.
//!
//! ## Features
//!
//! - **Message parsing**: Raw bytes to a MIME tree, with nested multipart
//!   and forwarded `message/rfc822` support
//! - **Decoding**: Base64, Quoted-Printable, RFC 2047 encoded words
//! - **Charsets**: UTF-8, ISO-8859-1 and Windows-1252, tried as a cascade
//! - **Content types**: Type, subtype and parameter parsing
//!
//! Parsing never rejects a message outright. Receipts from payment gateways
//! are frequently malformed, and a partially understood message is more
//! useful than an error.
//!
//! ## Quick Start
//!
//! ```
//! use struk_mime::Message;
//!
//! let raw = b"From: noreply@shopee.co.id\r\n\
//!             Subject: =?utf-8?Q?Bukti_Pembayaran?=\r\n\
//!             Content-Type: text/plain\r\n\
//!             \r\n\
//!             Total: Rp 75.500";
//!
//! let message = Message::parse(raw);
//! let subject = message.headers().get_decoded("subject").unwrap().unwrap();
//! assert_eq!(subject, "Bukti Pembayaran");
//!
//! for part in message.walk() {
//!     if part.is_type("text", "plain") {
//!         assert_eq!(part.body_text().unwrap(), "Total: Rp 75.500");
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod header;
mod message;

pub mod charset;
pub mod encoding;

pub use charset::Charset;
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::{Headers, extract_fields};
pub use message::{Message, Part, TransferEncoding, split_header_block};
