//! CSV writer: the first record's field names become the header row.
//!
//! Records are heterogeneous, so a record whose field names differ from
//! the current header starts a new header row (csvlite-style schema
//! blocks) rather than failing the stream.

use std::io::Write;

use crate::error::StreamResult;
use crate::output::RecordWriter;
use crate::types::{Context, Record};

/// CSV writer over any byte sink.
pub struct CsvRecordWriter<W: Write> {
    writer: csv::Writer<W>,
    header: Option<Vec<String>>,
}

impl<W: Write> CsvRecordWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(out),
            header: None,
        }
    }

    /// Flush and recover the underlying sink (e.g. a byte buffer in tests).
    pub fn into_inner(self) -> StreamResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::StreamError::Io(e.into_error()))
    }
}

impl<W: Write> RecordWriter for CsvRecordWriter<W> {
    fn write(&mut self, record: &Record, _context: &Context) -> StreamResult<()> {
        let keys: Vec<&str> = record.keys().collect();
        let header_matches = self
            .header
            .as_ref()
            .is_some_and(|h| h.iter().map(String::as_str).eq(keys.iter().copied()));

        if !header_matches {
            self.writer.write_record(&keys)?;
            self.header = Some(keys.iter().map(|k| k.to_string()).collect());
        }

        self.writer
            .write_record(record.iter().map(|(_, value)| value.to_string()))?;
        Ok(())
    }

    fn finish(&mut self, _context: &Context) -> StreamResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}
