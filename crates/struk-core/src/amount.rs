//! Transaction total extraction.
//!
//! A fixed cascade of patterns is tried in priority order and the first
//! one that matches anywhere in the text wins. There is no attempt to
//! pick the most plausible figure among several: a receipt that mentions a
//! subtotal before its grand total under the same pattern yields the
//! subtotal.
//!
//! Numbers carry no locale, so separators are disambiguated by shape. See
//! [`parse_token`].

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Digits, optionally grouped by `.` or `,`.
const TOKEN: &str = r"(\d+(?:[.,]\d+)*)";

/// Pattern templates, highest priority first. `{T}` is the numeric token.
const TEMPLATES: [&str; 7] = [
    // "Total Paid: Rp 50.000", "total paid 50.000"
    r"total\s+paid\s*:?\s*(?:rp\.?\s*)?{T}",
    // "Total: Rp 50.000", "Amount Rp50.000"
    r"(?:total|amount)\s*:?\s*rp\.?\s*{T}",
    // "Rp 50.000 (total)"
    r"rp\.?\s*{T}\s*\(?total\)?",
    // "Total: 50.000"
    r"(?:total|amount)\s*:?\s*{T}",
    // Bare currency markers.
    r"rp\.?\s*{T}",
    r"idr\s*{T}",
    r"rupiah\s*{T}",
];

#[allow(clippy::expect_used)]
static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TEMPLATES
        .iter()
        .map(|template| {
            RegexBuilder::new(&template.replace("{T}", TOKEN))
                .case_insensitive(true)
                .build()
                .expect("literal amount pattern")
        })
        .collect()
});

/// Extracts the transaction total from body text.
///
/// Returns `None` when no pattern yields a parseable number. Callers that
/// need a figure use `0.0`.
///
/// # Example
///
/// ```
/// use struk_core::amount::extract;
///
/// let text = "Subtotal Rp 1.000.000\nTotal Paid: Rp 50.000";
/// assert_eq!(extract(text), Some(50_000.0));
/// assert_eq!(extract("Thanks for shopping"), None);
/// ```
#[must_use]
pub fn extract(text: &str) -> Option<f64> {
    PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|captures| captures.get(1))
            .and_then(|token| parse_token(token.as_str()))
    })
}

/// Reads a numeric token whose separators may be Indonesian or English.
///
/// - Both `.` and `,`: `.` groups thousands, `,` is the decimal point
///   (`123.456,78` is 123456.78).
/// - Only `.`: one or two digits after the last `.` make it a decimal
///   point (`123.45`), otherwise every `.` groups thousands (`123.456`).
/// - Only `,` or neither: `,` groups thousands (`1,250` is 1250).
///
/// Returns `None` when the cleaned token is not a number, such as
/// `1.2.3`.
#[must_use]
pub fn parse_token(token: &str) -> Option<f64> {
    let has_dot = token.contains('.');
    let has_comma = token.contains(',');

    let cleaned = if has_dot && has_comma {
        token.replace('.', "").replace(',', ".")
    } else if has_dot {
        let after_last_dot = token.rsplit('.').next().unwrap_or_default();
        if after_last_dot.len() <= 2 {
            token.replace(',', "")
        } else {
            token.replace('.', "").replace(',', ".")
        }
    } else {
        token.replace(',', "")
    };

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}
