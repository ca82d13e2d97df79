//! CLI command implementations

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;
use struk_core::{
    CandidateFilter, Clock, CsvSink, DecodedMessage, EmlDirectory, FilterConfig, MailboxPort,
    ReceiptAssembler, ReceiptRecord, RecordSink, SystemClock, amount, decoder,
};
use struk_mime::Message;
use tracing::info;

use crate::cli::ScanArgs;
use crate::display::{self, ScanReport};

/// Run the full pipeline over an `.eml` directory.
pub async fn cmd_scan(args: &ScanArgs) -> Result<()> {
    let mut config = FilterConfig::load_or_default(args.config.as_deref())
        .await
        .context("Failed to load filter config")?;
    if let Some(days) = args.days {
        config.date_range_days = days;
    }
    if let Some(max) = args.max {
        config.max_results = max;
    }
    let filter = CandidateFilter::new(config).context("Invalid filter config")?;

    let mut mailbox = EmlDirectory::open(&args.mailbox)
        .await
        .with_context(|| format!("Failed to open mailbox {}", args.mailbox.display()))?;
    info!(messages = mailbox.len(), "Scanning mailbox");

    let mut csv_sink = CsvSink::new(&args.output);
    let sink: Option<&mut dyn RecordSink> = if args.dry_run {
        None
    } else {
        Some(&mut csv_sink)
    };

    let (records, report) = scan(&mut mailbox, &filter, &SystemClock, sink).await?;

    if records.is_empty() {
        println!("No receipt emails found");
    }
    for (i, record) in records.iter().enumerate() {
        print!("{}", display::record_block(i + 1, record));
    }
    let output = (!args.dry_run).then_some(args.output.as_path());
    print!("{}", display::summary(&report, output));
    Ok(())
}

/// Select, assemble and optionally persist, returning the records and
/// stage counts.
pub async fn scan<P, C>(
    port: &mut P,
    filter: &CandidateFilter,
    clock: &C,
    sink: Option<&mut dyn RecordSink>,
) -> Result<(Vec<ReceiptRecord>, ScanReport)>
where
    P: MailboxPort + Send,
    C: Clock,
{
    let selection = filter
        .select(port, clock)
        .await
        .context("Candidate selection failed")?;
    let assembly = ReceiptAssembler::new()
        .assemble(port, &selection.ids)
        .await
        .context("Fetching candidates failed")?;

    let written = match sink {
        Some(sink) => sink
            .append(&assembly.records)
            .context("Failed to save records")?,
        None => 0,
    };

    let report = ScanReport {
        sender_matched: selection.sender_matched,
        subject_matched: selection.subject_matched,
        selected: selection.final_count(),
        processed: assembly.records.len(),
        skipped: assembly.skipped.len(),
        written,
    };
    info!(?report, "Scan finished");
    Ok((assembly.records, report))
}

/// Decode one message file and print the result.
pub async fn cmd_inspect(file: &Path, json: bool) -> Result<()> {
    let raw = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    println!("{}", inspect(&raw, json)?);
    Ok(())
}

/// Render what the pipeline would make of one raw message.
pub fn inspect(raw: &[u8], json: bool) -> Result<String> {
    let parts = part_types(raw);
    let decoded = decoder::decode(raw);
    let total = amount::extract(&decoded.body_text);

    if json {
        let value = json!({
            "from": decoded.sender,
            "subject": decoded.subject,
            "date": decoded.timestamp.to_string(),
            "email_id": decoded.stable_id,
            "total_amount": total,
            "parts": parts,
            "body_text": decoded.body_text,
            "display_text": decoded.display_text,
        });
        return serde_json::to_string_pretty(&value).context("Failed to encode JSON");
    }

    Ok(inspect_text(&decoded, total, &parts))
}

fn inspect_text(decoded: &DecodedMessage, total: Option<f64>, parts: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "From:     {}", decoded.sender);
    let _ = writeln!(out, "Subject:  {}", decoded.subject);
    let _ = writeln!(out, "Date:     {}", decoded.timestamp);
    let _ = writeln!(out, "Email ID: {}", decoded.stable_id);
    let _ = writeln!(out, "Parts:    {}", parts.join(", "));
    let _ = writeln!(out, "Total:    {}", display::format_amount(total.unwrap_or(0.0)));
    let _ = write!(out, "\n{}", decoded.display_text);
    out
}

fn part_types(raw: &[u8]) -> Vec<String> {
    Message::parse(raw)
        .walk()
        .iter()
        .map(|part| {
            part.content_type()
                .map_or_else(|_| "invalid".to_string(), |ct| ct.mime_type())
        })
        .collect()
}
