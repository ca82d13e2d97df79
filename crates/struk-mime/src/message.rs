//! MIME message structure and parsing.

use crate::charset::{DEFAULT_CASCADE, decode_cascade};
use crate::content_type::ContentType;
use crate::encoding::{decode_base64, decode_quoted_printable};
use crate::error::Result;
use crate::header::Headers;

/// Nesting limit for multipart and `message/rfc822` bodies.
const MAX_DEPTH: usize = 16;

/// Transfer encoding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII.
    SevenBit,
    /// 8-bit binary.
    EightBit,
    /// Base64 encoding.
    Base64,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Binary (no encoding).
    Binary,
}

impl TransferEncoding {
    /// Parses transfer encoding from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "8bit" => Self::EightBit,
            "base64" => Self::Base64,
            "quoted-printable" => Self::QuotedPrintable,
            "binary" => Self::Binary,
            _ => Self::SevenBit, // Default (includes "7bit")
        }
    }
}

/// A node in the MIME tree.
///
/// Leaf parts carry a body; multipart and `message/rfc822` parts carry
/// their children in `parts` as well as the raw body they were split from.
#[derive(Debug, Clone, Default)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Part body (raw, still transfer-encoded).
    pub body: Vec<u8>,
    /// Child parts, in document order.
    pub parts: Vec<Part>,
}

impl Part {
    /// Creates a leaf part.
    #[must_use]
    pub const fn new(headers: Headers, body: Vec<u8>) -> Self {
        Self {
            headers,
            body,
            parts: Vec::new(),
        }
    }

    fn parse(raw: &[u8], depth: usize) -> Self {
        let (header_bytes, body) = split_header_block(raw);
        let headers = Headers::parse(&decode_cascade(header_bytes, &DEFAULT_CASCADE));
        let mut part = Self::new(headers, body.to_vec());

        if depth >= MAX_DEPTH {
            return part;
        }

        let content_type = part.content_type().unwrap_or_default();
        if content_type.is_multipart() {
            if let Some(boundary) = content_type.boundary() {
                part.parts = split_multipart(body, boundary)
                    .into_iter()
                    .map(|chunk| Self::parse(chunk, depth + 1))
                    .collect();
            }
        } else if content_type.is("message", "rfc822") {
            part.parts = vec![Self::parse(body, depth + 1)];
        }

        part
    }

    /// Gets the content type. A missing header yields the RFC 2045 default.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type header is malformed.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers
            .get("content-type")
            .map_or_else(|| Ok(ContentType::default()), ContentType::parse)
    }

    /// Checks the content type, treating a malformed header as `text/plain`.
    #[must_use]
    pub fn is_type(&self, main_type: &str, sub_type: &str) -> bool {
        self.content_type()
            .unwrap_or_default()
            .is(main_type, sub_type)
    }

    /// Gets the transfer encoding.
    #[must_use]
    pub fn transfer_encoding(&self) -> TransferEncoding {
        self.headers
            .get("content-transfer-encoding")
            .map_or(TransferEncoding::SevenBit, TransferEncoding::parse)
    }

    /// Decodes the body according to the transfer encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if a Base64 body is malformed.
    pub fn decode_body(&self) -> Result<Vec<u8>> {
        match self.transfer_encoding() {
            TransferEncoding::Base64 => decode_base64(&self.body),
            TransferEncoding::QuotedPrintable => Ok(decode_quoted_printable(&self.body)),
            _ => Ok(self.body.clone()),
        }
    }

    /// Gets the decoded body as text using the default charset cascade.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer encoding cannot be reversed.
    pub fn body_text(&self) -> Result<String> {
        Ok(decode_cascade(&self.decode_body()?, &DEFAULT_CASCADE))
    }

    /// Returns `true` when this part has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.parts.is_empty()
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Self>) {
        if self.is_leaf() {
            out.push(self);
        } else {
            for child in &self.parts {
                child.collect_leaves(out);
            }
        }
    }
}

/// A parsed MIME message.
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// The top-level entity: message headers plus body or child parts.
    pub root: Part,
}

impl Message {
    /// Parses a raw RFC 5322 message.
    ///
    /// Parsing never fails: a malformed multipart body is kept as an opaque
    /// single part, and header bytes that are not UTF-8 are decoded through
    /// the default charset cascade.
    #[must_use]
    pub fn parse(raw: &[u8]) -> Self {
        Self {
            root: Part::parse(raw, 0),
        }
    }

    /// Message headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.root.headers
    }

    /// Checks if the message was split into parts.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        !self.root.is_leaf()
    }

    /// Gets the From header.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.root.headers.get("from")
    }

    /// Gets the Subject header, still RFC 2047 encoded.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.root.headers.get("subject")
    }

    /// Gets the Date header.
    #[must_use]
    pub fn date(&self) -> Option<&str> {
        self.root.headers.get("date")
    }

    /// Gets the Message-ID header.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.root.headers.get("message-id")
    }

    /// Returns every leaf part in document order.
    ///
    /// A single-part message yields its root.
    #[must_use]
    pub fn walk(&self) -> Vec<&Part> {
        let mut leaves = Vec::new();
        self.root.collect_leaves(&mut leaves);
        leaves
    }
}

/// Splits raw bytes at the first empty line into header block and body.
///
/// Input without an empty line is all header.
#[must_use]
pub fn split_header_block(raw: &[u8]) -> (&[u8], &[u8]) {
    const EMPTY: &[u8] = &[];

    if let Some(body) = raw.strip_prefix(b"\r\n") {
        return (EMPTY, body);
    }
    if let Some(body) = raw.strip_prefix(b"\n") {
        return (EMPTY, body);
    }

    let crlf = find(raw, b"\r\n\r\n").map(|i| (i, 4));
    let lf = find(raw, b"\n\n").map(|i| (i, 2));
    let split = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    split.map_or((raw, EMPTY), |(idx, len)| (&raw[..idx], &raw[idx + len..]))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Splits a multipart body into the chunks between boundary delimiters.
///
/// The preamble before the first delimiter and the epilogue after the close
/// delimiter are discarded. A body missing its close delimiter keeps its
/// last chunk.
fn split_multipart<'a>(body: &'a [u8], boundary: &str) -> Vec<&'a [u8]> {
    let delimiter = format!("--{boundary}");
    let mut chunks = Vec::new();
    let mut chunk_start: Option<usize> = None;
    let mut pos = 0;

    while pos < body.len() {
        let line_end = body[pos..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(body.len(), |i| pos + i + 1);
        let line = body[pos..line_end].trim_ascii_end();

        if let Some(rest) = line.strip_prefix(delimiter.as_bytes()) {
            let is_close = rest.starts_with(b"--");
            if rest.is_empty() || is_close {
                if let Some(start) = chunk_start.take() {
                    chunks.push(strip_trailing_newline(&body[start..pos]));
                }
                if is_close {
                    return chunks;
                }
                chunk_start = Some(line_end);
            }
        }

        pos = line_end;
    }

    if let Some(start) = chunk_start {
        chunks.push(&body[start..]);
    }
    chunks
}

/// The line break before a delimiter belongs to the delimiter.
fn strip_trailing_newline(chunk: &[u8]) -> &[u8] {
    chunk
        .strip_suffix(b"\r\n")
        .or_else(|| chunk.strip_suffix(b"\n"))
        .unwrap_or(chunk)
}
