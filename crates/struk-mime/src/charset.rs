//! Character set decoding for message bodies and encoded words.
//!
//! Only the handful of charsets that show up in receipt mail are known.
//! Everything else goes through [`decode_cascade`], which tries a fixed
//! list of charsets and finally falls back to lossy UTF-8.

use crate::error::{Error, Result};

/// The order in which body text is tried when no charset wins outright.
pub const DEFAULT_CASCADE: [Charset; 3] = [Charset::Utf8, Charset::Latin1, Charset::Windows1252];

/// Windows-1252 mappings for 0x80..=0x9F. `None` marks undefined bytes.
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// A character set this crate can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// UTF-8 (also used for US-ASCII).
    Utf8,
    /// ISO-8859-1. C1 control bytes are rejected.
    ///
    /// Plain ISO-8859-1 maps 0x80..=0x9F to U+0080..=U+009F. Rejecting them
    /// instead lets such text fall through to [`Charset::Windows1252`].
    Latin1,
    /// Windows-1252.
    Windows1252,
}

impl Charset {
    /// Looks up a charset by its MIME label.
    ///
    /// # Errors
    ///
    /// Returns an error if the label names a charset this crate cannot decode.
    pub fn from_label(label: &str) -> Result<Self> {
        match label.trim().trim_matches('"').to_lowercase().as_str() {
            "utf-8" | "utf8" | "us-ascii" | "ascii" => Ok(Self::Utf8),
            "iso-8859-1" | "iso_8859-1" | "iso8859-1" | "latin1" | "latin-1" | "l1" => {
                Ok(Self::Latin1)
            }
            "windows-1252" | "cp1252" | "x-cp1252" => Ok(Self::Windows1252),
            other => Err(Error::UnsupportedCharset(other.to_string())),
        }
    }

    /// Decodes bytes strictly, returning `None` on the first byte the
    /// charset cannot represent.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            Self::Latin1 => bytes
                .iter()
                .map(|&b| (!(0x80..=0x9F).contains(&b)).then_some(char::from(b)))
                .collect(),
            Self::Windows1252 => bytes
                .iter()
                .map(|&b| match b {
                    0x80..=0x9F => WINDOWS_1252_HIGH[usize::from(b - 0x80)],
                    _ => Some(char::from(b)),
                })
                .collect(),
        }
    }
}

/// Decodes bytes with the first charset in `order` that accepts them.
///
/// If every charset rejects the input, invalid sequences are replaced with
/// U+FFFD.
#[must_use]
pub fn decode_cascade(bytes: &[u8], order: &[Charset]) -> String {
    order
        .iter()
        .find_map(|charset| charset.decode(bytes))
        .unwrap_or_else(|| String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label() {
        assert_eq!(Charset::from_label("UTF-8").unwrap(), Charset::Utf8);
        assert_eq!(Charset::from_label("\"us-ascii\"").unwrap(), Charset::Utf8);
        assert_eq!(Charset::from_label("ISO-8859-1").unwrap(), Charset::Latin1);
        assert_eq!(Charset::from_label("cp1252").unwrap(), Charset::Windows1252);
        assert!(Charset::from_label("koi8-r").is_err());
    }

    #[test]
    fn test_utf8_preferred() {
        let text = decode_cascade("Total: Rp 50.000 ✓".as_bytes(), &DEFAULT_CASCADE);
        assert_eq!(text, "Total: Rp 50.000 ✓");
    }

    #[test]
    fn test_latin1_fallback() {
        // "café" in ISO-8859-1
        let text = decode_cascade(b"caf\xE9", &DEFAULT_CASCADE);
        assert_eq!(text, "café");
    }

    #[test]
    fn test_windows1252_fallback() {
        // Curly quotes are C1 bytes, which Latin-1 rejects.
        let text = decode_cascade(b"\x93Paid\x94 \x80 5", &DEFAULT_CASCADE);
        assert_eq!(text, "\u{201C}Paid\u{201D} \u{20AC} 5");
    }

    #[test]
    fn test_lossy_fallback() {
        // 0x81 is undefined in Windows-1252 and a C1 byte for Latin-1.
        let text = decode_cascade(b"a\x81b", &DEFAULT_CASCADE);
        assert_eq!(text, "a\u{FFFD}b");
    }

    #[test]
    fn test_empty_order_is_lossy_utf8() {
        assert_eq!(decode_cascade(b"ok", &[]), "ok");
    }

    proptest::proptest! {
        #[test]
        fn test_utf8_text_roundtrips(text in "\\PC*") {
            proptest::prop_assert_eq!(decode_cascade(text.as_bytes(), &DEFAULT_CASCADE), text);
        }

        #[test]
        fn test_single_byte_charsets_map_one_char_per_byte(bytes in proptest::collection::vec(proptest::num::u8::ANY, 0..64)) {
            for charset in [Charset::Latin1, Charset::Windows1252] {
                if let Some(text) = charset.decode(&bytes) {
                    proptest::prop_assert_eq!(text.chars().count(), bytes.len());
                }
            }
        }
    }
}
