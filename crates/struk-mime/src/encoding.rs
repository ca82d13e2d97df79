//! MIME transfer-encoding decoders.
//!
//! Supports Base64, Quoted-Printable, and RFC 2047 encoded words. All
//! decoders are lenient: mail in the wild routinely drops padding, leaves
//! stray `=` signs in quoted-printable bodies, and folds encoded words across
//! lines.

use crate::charset::{Charset, DEFAULT_CASCADE, decode_cascade};
use crate::error::{Error, Result};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// Base64 engine that accepts input with or without padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes Base64 data, ignoring embedded whitespace and line breaks.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &[u8]) -> Result<Vec<u8>> {
    let cleaned: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    LENIENT_BASE64.decode(cleaned).map_err(Into::into)
}

/// Decodes Quoted-Printable data (RFC 2045).
///
/// Soft line breaks are removed. An `=` that does not start a valid escape
/// is kept literally.
#[must_use]
pub fn decode_quoted_printable(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        if byte != b'=' {
            result.push(byte);
            i += 1;
            continue;
        }

        match data.get(i + 1..) {
            // Soft line break
            Some([b'\r', b'\n', ..]) => i += 3,
            Some([b'\n', ..]) => i += 2,
            Some([hi, lo, ..]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                result.push((hex_value(*hi) << 4) | hex_value(*lo));
                i += 3;
            }
            _ => {
                result.push(b'=');
                i += 1;
            }
        }
    }

    result
}

const fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

/// One `=?charset?encoding?text?=` token.
struct EncodedWord<'a> {
    charset: &'a str,
    encoding: char,
    text: &'a str,
}

impl EncodedWord<'_> {
    fn decode(&self) -> Result<String> {
        let bytes = match self.encoding.to_ascii_uppercase() {
            'B' => decode_base64(self.text.as_bytes())?,
            'Q' => decode_quoted_printable(self.text.replace('_', " ").as_bytes()),
            other => {
                return Err(Error::InvalidEncoding(format!(
                    "Unknown encoded-word encoding: {other}"
                )));
            }
        };

        // RFC 2231 allows a language suffix: utf-8*en
        let label = self.charset.split('*').next().unwrap_or_default();
        Ok(Charset::from_label(label)
            .ok()
            .and_then(|charset| charset.decode(&bytes))
            .unwrap_or_else(|| decode_cascade(&bytes, &DEFAULT_CASCADE)))
    }
}

/// Parses an encoded word at the start of `s`, returning it and the number
/// of bytes it spans.
fn parse_encoded_word(s: &str) -> Option<(EncodedWord<'_>, usize)> {
    let inner = s.strip_prefix("=?")?;
    let (charset, after_charset) = inner.split_once('?')?;
    let mut chars = after_charset.chars();
    let encoding = chars.next()?;
    let after_encoding = chars.as_str().strip_prefix('?')?;
    let end = after_encoding.find("?=")?;
    let text = &after_encoding[..end];

    if charset.is_empty()
        || charset.contains(char::is_whitespace)
        || text.contains(char::is_whitespace)
    {
        return None;
    }

    let consumed = s.len() - after_encoding.len() + end + 2;
    Some((
        EncodedWord {
            charset,
            encoding,
            text,
        },
        consumed,
    ))
}

/// Decodes every RFC 2047 encoded word in a header value.
///
/// Plain text between words is kept; whitespace separating two adjacent
/// encoded words is dropped, as RFC 2047 section 6.2 requires.
///
/// # Errors
///
/// Returns an error if an encoded word uses an unknown encoding or carries
/// malformed Base64.
pub fn decode_rfc2047(text: &str) -> Result<String> {
    let mut decoded = String::with_capacity(text.len());
    let mut rest = text;
    let mut after_word = false;

    while let Some(start) = rest.find("=?") {
        let (before, candidate) = rest.split_at(start);
        if let Some((word, consumed)) = parse_encoded_word(candidate) {
            if !(after_word && before.chars().all(char::is_whitespace)) {
                decoded.push_str(before);
            }
            decoded.push_str(&word.decode()?);
            rest = &candidate[consumed..];
            after_word = true;
        } else {
            decoded.push_str(before);
            decoded.push_str("=?");
            rest = &candidate[2..];
            after_word = false;
        }
    }

    decoded.push_str(rest);
    Ok(decoded)
}
