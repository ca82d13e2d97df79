//! Raw message bytes to a [`DecodedMessage`].
//!
//! Decoding never fails. Every field has a fallback: an undecodable
//! subject is kept raw, an unparseable date is kept as written, a missing
//! `Message-ID` is replaced by a content fingerprint, and a part whose
//! transfer encoding is broken is read as raw bytes.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use regex::Regex;
use sha2::{Digest, Sha256};
use struk_mime::charset::{DEFAULT_CASCADE, decode_cascade};
use struk_mime::{Message, Part};
use tracing::debug;

/// Prefix of fingerprint ids for messages without a `Message-ID`.
pub const SYNTHETIC_ID_PREFIX: &str = "no-id-";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[allow(clippy::expect_used)]
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("literal tag pattern"));

#[allow(clippy::expect_used)]
static HORIZONTAL_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("literal space pattern"));

#[allow(clippy::expect_used)]
static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\n\s*").expect("literal line break pattern"));

/// When a message was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    /// The `Date` header parsed as RFC 2822.
    Parsed(DateTime<FixedOffset>),
    /// The `Date` header exactly as written, or empty if there was none.
    Raw(String),
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(date) => write!(f, "{}", date.format(TIMESTAMP_FORMAT)),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

/// A message reduced to the fields a receipt record needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    /// The `From` header, encoded words decoded.
    pub sender: String,
    /// The `Subject` header, encoded words decoded.
    pub subject: String,
    /// The `Date` header.
    pub timestamp: Timestamp,
    /// The `Message-ID`, or a content fingerprint. Never empty.
    pub stable_id: String,
    /// Plain text parts joined by newlines, else HTML parts.
    pub body_text: String,
    /// `body_text` without markup, whitespace normalized.
    pub display_text: String,
}

/// Decodes a raw RFC 5322 message.
#[must_use]
pub fn decode(raw: &[u8]) -> DecodedMessage {
    let message = Message::parse(raw);
    let headers = message.headers();

    let sender = decoded_header(&message, "from");
    let subject = decoded_header(&message, "subject");
    let raw_date = headers.get("date").unwrap_or_default();
    let timestamp = parse_date(raw_date)
        .map_or_else(|| Timestamp::Raw(raw_date.to_string()), Timestamp::Parsed);

    let body_text = extract_body(&message);
    let display_text = display_text(&body_text);

    let stable_id = message
        .message_id()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map_or_else(
            || fingerprint(&sender, &subject, raw_date, &body_text),
            str::to_string,
        );

    DecodedMessage {
        sender,
        subject,
        timestamp,
        stable_id,
        body_text,
        display_text,
    }
}

/// Parses an RFC 2822 date, ignoring a trailing comment such as `(UTC)`.
///
/// The weekday is dropped unchecked, since senders get it wrong. A zone
/// name chrono does not know, such as `WIB`, is read as `-0000`: the wall
/// clock time is kept at offset zero.
pub(crate) fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let mut value = raw.trim();
    if value.ends_with(')')
        && let Some(open) = value.rfind('(')
    {
        value = value[..open].trim_end();
    }
    if let Some((weekday, rest)) = value.split_once(',')
        && weekday.trim().chars().all(|c| c.is_ascii_alphabetic())
    {
        value = rest.trim_start();
    }

    DateTime::parse_from_rfc2822(value)
        .ok()
        .or_else(|| parse_with_unknown_zone(value))
}

fn parse_with_unknown_zone(value: &str) -> Option<DateTime<FixedOffset>> {
    let (local, zone) = value.rsplit_once(char::is_whitespace)?;
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let local = local.trim_end();
    ["%d %b %Y %H:%M:%S", "%d %b %Y %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(local, format).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

fn decoded_header(message: &Message, name: &str) -> String {
    match message.headers().get_decoded(name) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            debug!(header = name, error = %e, "Keeping undecodable header raw");
            message.headers().get(name).unwrap_or_default().to_string()
        }
        None => String::new(),
    }
}

fn extract_body(message: &Message) -> String {
    if !message.is_multipart() {
        return part_text(&message.root);
    }

    let mut plain = Vec::new();
    let mut html = Vec::new();
    for part in message.walk() {
        let bucket = if part.is_type("text", "plain") {
            &mut plain
        } else if part.is_type("text", "html") {
            &mut html
        } else {
            continue;
        };
        let text = part_text(part);
        if !text.trim().is_empty() {
            bucket.push(text);
        }
    }

    if plain.is_empty() {
        if html.is_empty() {
            debug!("No text/plain or text/html parts found");
        }
        html.join("\n")
    } else {
        plain.join("\n")
    }
}

fn part_text(part: &Part) -> String {
    part.body_text().unwrap_or_else(|e| {
        debug!(error = %e, "Reading part body without transfer decoding");
        decode_cascade(&part.body, &DEFAULT_CASCADE)
    })
}

/// Strips markup from body text and normalizes whitespace.
///
/// Entities are decoded before tags are removed, so escaped markup in the
/// source text is stripped too.
#[must_use]
pub fn display_text(body_text: &str) -> String {
    let unescaped = html_escape::decode_html_entities(body_text);
    let untagged = TAG.replace_all(&unescaped, "");
    let spaced = HORIZONTAL_SPACE.replace_all(&untagged, " ");
    LINE_BREAKS.replace_all(&spaced, "\n").trim().to_string()
}

fn fingerprint(sender: &str, subject: &str, date: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    for field in [sender, subject, date, body] {
        hasher.update(field.as_bytes());
        hasher.update([0]);
    }
    let digest = hex::encode(hasher.finalize());
    format!("{SYNTHETIC_ID_PREFIX}{}", &digest[..16])
}
