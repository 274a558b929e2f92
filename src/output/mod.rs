//! Record writers: sinks consuming the tail of the pipeline.
//!
//! A writer serialises each surviving record; `finish` runs exactly once,
//! when the end-of-stream marker reaches the writer. Absent-valued fields
//! never appear in output.

pub mod csv;
pub mod dkvp;
pub mod json;

pub use self::csv::CsvRecordWriter;
pub use dkvp::DkvpWriter;
pub use json::JsonRecordWriter;

use crate::error::StreamResult;
use crate::types::{Context, Record};

/// A sink for records.
pub trait RecordWriter {
    /// Serialise one record.
    fn write(&mut self, record: &Record, context: &Context) -> StreamResult<()>;

    /// Called once, on end of stream. The context carries final counters.
    fn finish(&mut self, _context: &Context) -> StreamResult<()> {
        Ok(())
    }
}

/// In-memory sink collecting records; useful in tests and doctests.
#[derive(Debug, Default)]
pub struct CollectWriter {
    /// Records received so far, in arrival order.
    pub records: Vec<Record>,
    /// Whether the end-of-stream marker has arrived.
    pub finished: bool,
}

impl RecordWriter for CollectWriter {
    fn write(&mut self, record: &Record, _context: &Context) -> StreamResult<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self, _context: &Context) -> StreamResult<()> {
        self.finished = true;
        Ok(())
    }
}
