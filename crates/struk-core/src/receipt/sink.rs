//! Append-only persistence of receipt records.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::info;

use super::ReceiptRecord;

/// Errors a record sink can report.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The target could not be opened or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Durable, append-only destination for records.
///
/// Appending the same records twice stores them twice. Existing rows are
/// never rewritten.
pub trait RecordSink {
    /// Appends `records` in order and returns how many were written.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be written.
    fn append(&mut self, records: &[ReceiptRecord]) -> Result<usize, SinkError>;
}

/// Appends records to a CSV file.
///
/// The header row is written only when the file is missing or empty.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    /// Creates a sink for the CSV file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn append(&mut self, records: &[ReceiptRecord]) -> Result<usize, SinkError> {
        if records.is_empty() {
            return Ok(0);
        }

        let is_new = std::fs::metadata(&self.path).map_or(true, |m| m.len() == 0);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        if is_new {
            info!(path = %self.path.display(), "Created CSV file");
        }
        info!(path = %self.path.display(), count = records.len(), "Saved records");
        Ok(records.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn record(id: &str, amount: f64) -> ReceiptRecord {
        ReceiptRecord {
            from: "noreply@grab.com".to_string(),
            subject: "Your Grab E-Receipt".to_string(),
            date: "2024-01-10 12:00:00".to_string(),
            total_amount: amount,
            email_id: id.to_string(),
            raw: "Total, incl. tax: Rp 20.000".to_string(),
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipts.csv");
        let mut sink = CsvSink::new(&path);

        assert_eq!(sink.append(&[record("<1>", 20_000.0)]).unwrap(), 1);
        assert_eq!(sink.append(&[record("<2>", 0.0), record("<3>", 5.5)]).unwrap(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "from,subject,date,total_amount,email_id,raw");
        assert_eq!(
            contents.matches("from,subject,date,total_amount,email_id,raw").count(),
            1
        );
    }

    #[test]
    fn test_rows_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipts.csv");
        let mut sink = CsvSink::new(&path);
        sink.append(&[record("<1>", 20_000.0)]).unwrap();
        sink.append(&[record("<1>", 20_000.0)]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<ReceiptRecord> = reader.deserialize().map(Result::unwrap).collect();
        assert_eq!(rows, vec![record("<1>", 20_000.0), record("<1>", 20_000.0)]);
    }

    #[test]
    fn test_empty_batch_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipts.csv");
        let mut sink = CsvSink::new(&path);
        assert_eq!(sink.append(&[]).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_existing_file_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipts.csv");
        std::fs::write(&path, "").unwrap();
        CsvSink::new(&path).append(&[record("<1>", 1.0)]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("from,subject,date,total_amount,email_id,raw\n"));
    }

    #[test]
    fn test_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::new(dir.path().join("missing").join("receipts.csv"));
        let err = sink.append(&[record("<1>", 1.0)]).unwrap_err();
        assert!(matches!(err, SinkError::Io(_)));
    }
}
