//! The flat record written for each processed message.

use serde::{Deserialize, Serialize};

use crate::decoder::DecodedMessage;

/// One receipt, ready for the sink.
///
/// Field order is the column order of the CSV output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    /// Sender as written in the `From` header.
    pub from: String,
    /// Decoded subject.
    pub subject: String,
    /// `YYYY-MM-DD HH:MM:SS`, or the raw `Date` header if it did not parse.
    pub date: String,
    /// Extracted total, `0.0` when none was found.
    pub total_amount: f64,
    /// `Message-ID` or content fingerprint.
    pub email_id: String,
    /// Display text of the body.
    pub raw: String,
}

impl ReceiptRecord {
    /// Builds a record from a decoded message and its extracted amount.
    #[must_use]
    pub fn new(message: DecodedMessage, amount: Option<f64>) -> Self {
        Self {
            from: message.sender,
            subject: message.subject,
            date: message.timestamp.to_string(),
            total_amount: amount.unwrap_or(0.0),
            email_id: message.stable_id,
            raw: message.display_text,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::decoder::Timestamp;

    fn message() -> DecodedMessage {
        DecodedMessage {
            sender: "noreply@ovo.id".to_string(),
            subject: "Bukti Pembayaran".to_string(),
            timestamp: Timestamp::Raw("kemarin".to_string()),
            stable_id: "<1@ovo.id>".to_string(),
            body_text: "<b>Total Rp 10.000</b>".to_string(),
            display_text: "Total Rp 10.000".to_string(),
        }
    }

    #[test]
    fn test_new_defaults_missing_amount_to_zero() {
        let record = ReceiptRecord::new(message(), None);
        assert_eq!(record.total_amount, 0.0);
        assert_eq!(record.date, "kemarin");
        assert_eq!(record.raw, "Total Rp 10.000");
    }

    #[test]
    fn test_new_keeps_amount() {
        let record = ReceiptRecord::new(message(), Some(10_000.0));
        assert_eq!(record.total_amount, 10_000.0);
        assert_eq!(record.email_id, "<1@ovo.id>");
    }
}
