//! MIME header handling.

use crate::encoding::decode_rfc2047;
use crate::error::Result;

/// Collection of email headers, in the order they appeared.
///
/// Lookups are case-insensitive; a name may appear more than once.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Gets all values for a header.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Gets the first value for a header with RFC 2047 encoded words decoded.
    ///
    /// Returns `None` when the header is absent.
    #[must_use]
    pub fn get_decoded(&self, name: &str) -> Option<Result<String>> {
        self.get(name).map(decode_rfc2047)
    }

    /// Returns the number of header fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no header fields are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over all headers.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Parses a header block.
    ///
    /// Folded continuation lines (starting with space or tab) are unfolded
    /// into a single space. Parsing stops at the first empty line. Lines
    /// without a colon are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.lines() {
            if line.is_empty() {
                break;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }

            if let Some((name, value)) = current.take() {
                headers.add(name, value.trim());
            }

            if let Some((name, value)) = line.split_once(':') {
                current = Some((name.trim().to_string(), value.trim().to_string()));
            }
        }

        if let Some((name, value)) = current {
            headers.add(name, value.trim());
        }

        headers
    }
}

/// Extracts the named fields from a raw header block, keeping each field
/// exactly as stored (including folded continuation lines).
///
/// This is the shape of an IMAP `BODY[HEADER.FIELDS (...)]` response: the
/// selected lines in their original order, CRLF terminated, followed by an
/// empty line.
#[must_use]
pub fn extract_fields(header_block: &str, fields: &[&str]) -> String {
    let mut out = String::new();
    let mut keep = false;

    for line in header_block.lines() {
        if line.is_empty() {
            break;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            if keep {
                out.push_str(line);
                out.push_str("\r\n");
            }
            continue;
        }

        keep = line.split_once(':').is_some_and(|(name, _)| {
            let name = name.trim();
            fields.iter().any(|f| f.eq_ignore_ascii_case(name))
        });
        if keep {
            out.push_str(line);
            out.push_str("\r\n");
        }
    }

    out.push_str("\r\n");
    out
}
