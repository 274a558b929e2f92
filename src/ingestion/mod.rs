//! Record readers: envelope sources feeding the head of the pipeline.
//!
//! A reader produces fully-constructed [`Record`]s one at a time; the
//! engine stamps stream counters onto each one and terminates the stream
//! with exactly one end-of-stream marker. Formats:
//!
//! - **DKVP**: `key=value` pairs joined by the field separator, one record
//!   per line. The native format.
//! - **CSV**: header row names the fields.
//! - **JSON**: an array of objects, a single object, or NDJSON; nested
//!   objects/arrays become MAP/ARRAY values.
//!
//! DKVP and CSV are untyped text, so their values go through data-file
//! type inference; JSON is typed and maps directly.

pub mod csv;
pub mod dkvp;
pub mod json;

pub use self::csv::CsvRecordReader;
pub use dkvp::DkvpReader;
pub use json::JsonRecordReader;

use std::path::Path;

use crate::error::{StreamError, StreamResult};
use crate::types::{Context, Record};

/// A source of records.
pub trait RecordReader: Send + std::fmt::Debug {
    /// Produce the next record, or `None` when the source is exhausted.
    fn read(&mut self) -> StreamResult<Option<Record>>;
}

/// A reader producing no records, for chains headed by an input-ignoring
/// verb such as `seqgen`.
#[derive(Debug, Default)]
pub struct EmptyReader;

impl RecordReader for EmptyReader {
    fn read(&mut self) -> StreamResult<Option<Record>> {
        Ok(None)
    }
}

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderFormat {
    /// Delimited key-value pairs, one record per line.
    Dkvp,
    /// Comma-separated values with a header row.
    Csv,
    /// JSON array-of-objects or NDJSON.
    Json,
}

impl ReaderFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "dkvp" => Some(Self::Dkvp),
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Open a reader for `path`, inferring the format from its extension.
///
/// The context supplies the input separators for separator-driven formats.
pub fn reader_for_path(
    path: impl AsRef<Path>,
    context: &Context,
) -> StreamResult<Box<dyn RecordReader>> {
    let path = path.as_ref();
    let format = infer_format_from_path(path)?;
    reader_for_format(path, format, context)
}

/// Open a reader for `path` in an explicitly chosen format.
pub fn reader_for_format(
    path: &Path,
    format: ReaderFormat,
    context: &Context,
) -> StreamResult<Box<dyn RecordReader>> {
    match format {
        ReaderFormat::Dkvp => Ok(Box::new(DkvpReader::from_path(
            path,
            &context.ifs,
            &context.ips,
        )?)),
        ReaderFormat::Csv => Ok(Box::new(CsvRecordReader::from_path(path)?)),
        ReaderFormat::Json => Ok(Box::new(JsonRecordReader::from_path(path)?)),
    }
}

fn infer_format_from_path(path: &Path) -> StreamResult<ReaderFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| StreamError::Format {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    ReaderFormat::from_extension(ext).ok_or_else(|| StreamError::Format {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}
