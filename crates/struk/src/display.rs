//! Console rendering of records and run summaries.

use std::fmt::Write as _;
use std::path::Path;

use struk_core::ReceiptRecord;

const RULE_WIDTH: usize = 50;
const EMAIL_ID_WIDTH: usize = 50;

/// Stage counts of one scan.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub sender_matched: usize,
    pub subject_matched: usize,
    pub selected: usize,
    pub processed: usize,
    pub skipped: usize,
    pub written: usize,
}

/// Formats a total as `Rp 75,500`, or `Not found` for a zero total.
pub fn format_amount(amount: f64) -> String {
    if amount > 0.0 {
        format!("Rp {}", group_thousands(&format!("{:.0}", amount.round())))
    } else {
        "Not found".to_string()
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Renders one record as a numbered block.
pub fn record_block(index: usize, record: &ReceiptRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{index:2}. From: {}", record.from);
    let _ = writeln!(out, "    Subject: {}", record.subject);
    let _ = writeln!(out, "    Date: {}", record.date);
    let _ = writeln!(out, "    Email ID: {}", truncate(&record.email_id, EMAIL_ID_WIDTH));
    let _ = writeln!(out, "    Total Amount: {}", format_amount(record.total_amount));
    let _ = writeln!(out, "    {}", "-".repeat(RULE_WIDTH));
    out
}

/// Renders the stage counts, and where records went.
pub fn summary(report: &ScanReport, output: Option<&Path>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sender matches:  {}", report.sender_matched);
    let _ = writeln!(out, "Subject matches: {}", report.subject_matched);
    let _ = writeln!(out, "Selected:        {}", report.selected);
    let _ = writeln!(out, "Processed:       {}", report.processed);
    let _ = writeln!(out, "Skipped:         {}", report.skipped);
    match output {
        Some(path) => {
            let _ = writeln!(out, "Written:         {} to {}", report.written, path.display());
        }
        None => {
            let _ = writeln!(out, "Written:         0 (dry run)");
        }
    }
    out
}
