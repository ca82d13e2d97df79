//! CLI tests

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use clap::Parser;
use struk_core::{CandidateFilter, CsvSink, FilterConfig, FixedClock, MemoryMailbox, RecordSink};

use crate::cli::{Cli, Commands};
use crate::commands;
use crate::display::{self, ScanReport, format_amount, truncate};

const RECEIPT: &str = "From: noreply@shopee.co.id\r\n\
    Subject: Your Shopee Receipt\r\n\
    Date: Wed, 10 Jan 2024 09:15:00 +0700\r\n\
    Message-ID: <order-1@shopee.co.id>\r\n\
    \r\n\
    Thank you for your order. Total: Rp 75.500";

fn clock() -> FixedClock {
    FixedClock::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
}

fn filter() -> CandidateFilter {
    CandidateFilter::new(FilterConfig {
        sender_domains: vec!["shopee.co.id".to_string()],
        subject_patterns: vec!["receipt".to_string()],
        date_range_days: 10,
        max_results: 10,
    })
    .unwrap()
}

// ========== Argument Parsing ==========

#[test]
fn test_parse_scan_defaults() {
    let cli = Cli::try_parse_from(["struk", "scan", "--mailbox", "mail"]).unwrap();
    assert!(!cli.verbose);
    let Commands::Scan(args) = cli.command else {
        panic!("expected scan");
    };
    assert_eq!(args.mailbox.to_str(), Some("mail"));
    assert_eq!(args.output.to_str(), Some("receipts.csv"));
    assert!(args.config.is_none());
    assert!(args.days.is_none());
    assert!(!args.dry_run);
}

#[test]
fn test_parse_scan_overrides() {
    let cli = Cli::try_parse_from([
        "struk", "scan", "-m", "mail", "--days", "30", "--max", "5", "--dry-run", "-v",
    ])
    .unwrap();
    assert!(cli.verbose);
    let Commands::Scan(args) = cli.command else {
        panic!("expected scan");
    };
    assert_eq!(args.days, Some(30));
    assert_eq!(args.max, Some(5));
    assert!(args.dry_run);
}

#[test]
fn test_parse_scan_requires_mailbox() {
    assert!(Cli::try_parse_from(["struk", "scan"]).is_err());
}

#[test]
fn test_parse_inspect() {
    let cli = Cli::try_parse_from(["struk", "inspect", "one.eml", "--json"]).unwrap();
    let Commands::Inspect { file, json } = cli.command else {
        panic!("expected inspect");
    };
    assert_eq!(file.to_str(), Some("one.eml"));
    assert!(json);
}

// ========== Display ==========

#[test]
fn test_format_amount() {
    assert_eq!(format_amount(75_500.0), "Rp 75,500");
    assert_eq!(format_amount(1_234_567.89), "Rp 1,234,568");
    assert_eq!(format_amount(999.0), "Rp 999");
    assert_eq!(format_amount(0.0), "Not found");
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("<0123456789@example.com>", 10), "<012345...");
    assert_eq!(truncate("éééééé", 5), "éé...");
}

#[test]
fn test_summary_dry_run() {
    let report = ScanReport {
        sender_matched: 3,
        subject_matched: 2,
        selected: 2,
        processed: 1,
        skipped: 1,
        written: 0,
    };
    let text = display::summary(&report, None);
    assert!(text.contains("Sender matches:  3"));
    assert!(text.contains("Skipped:         1"));
    assert!(text.contains("(dry run)"));
}

// ========== Commands ==========

#[tokio::test]
async fn test_scan_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("receipts.csv");
    let mut mailbox = MemoryMailbox::new();
    mailbox.push(RECEIPT);
    mailbox.push("From: promo@shopee.co.id\r\nDate: Wed, 10 Jan 2024 09:15:00 +0700\r\nSubject: Sale\r\n\r\n");

    let mut sink = CsvSink::new(&path);
    let (records, report) =
        commands::scan(&mut mailbox, &filter(), &clock(), Some(&mut sink as &mut dyn RecordSink))
            .await
            .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(
        report,
        ScanReport {
            sender_matched: 2,
            subject_matched: 1,
            selected: 1,
            processed: 1,
            skipped: 0,
            written: 1,
        }
    );
    assert!(path.exists());
}

#[tokio::test]
async fn test_scan_dry_run_skips_sink() {
    let mut mailbox = MemoryMailbox::new();
    mailbox.push(RECEIPT);

    let (records, report) = commands::scan(&mut mailbox, &filter(), &clock(), None)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(report.written, 0);
    assert!(display::record_block(1, &records[0]).contains("Total Amount: Rp 75,500"));
}

#[tokio::test]
async fn test_scan_fatal_error() {
    let mut mailbox = MemoryMailbox::new();
    mailbox.push(RECEIPT);
    mailbox.disconnect();

    let result = commands::scan(&mut mailbox, &filter(), &clock(), None).await;
    assert!(result.is_err());
}

#[test]
fn test_inspect_text() {
    let text = commands::inspect(RECEIPT.as_bytes(), false).unwrap();
    assert!(text.contains("Subject:  Your Shopee Receipt"));
    assert!(text.contains("Date:     2024-01-10 09:15:00"));
    assert!(text.contains("Parts:    text/plain"));
    assert!(text.contains("Total:    Rp 75,500"));
}

#[test]
fn test_inspect_json() {
    let text = commands::inspect(RECEIPT.as_bytes(), true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["total_amount"], 75_500.0);
    assert_eq!(value["email_id"], "<order-1@shopee.co.id>");
    assert_eq!(value["parts"][0], "text/plain");
}

#[test]
fn test_inspect_json_without_total() {
    let text = commands::inspect(b"Subject: hi\r\n\r\nno money here", true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(value["total_amount"].is_null());
}

#[tokio::test]
async fn test_cmd_inspect_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = commands::cmd_inspect(&dir.path().join("nope.eml"), false).await;
    assert!(result.is_err());
}
