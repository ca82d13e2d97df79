//! Receipt records: assembly from candidates and persistence.

mod assembler;
mod model;
mod sink;

pub use assembler::{Assembly, ReceiptAssembler};
pub use model::ReceiptRecord;
pub use sink::{CsvSink, RecordSink, SinkError};
