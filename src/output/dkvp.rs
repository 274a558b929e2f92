//! DKVP writer: `key=value` pairs joined by the output field separator,
//! one record per line.

use std::io::Write;

use crate::error::StreamResult;
use crate::output::RecordWriter;
use crate::types::{Context, Record};

/// Line-oriented writer for the native key-value pair format.
///
/// Uses the context's `ofs`, `ops`, and `ors` separators.
pub struct DkvpWriter<W: Write> {
    out: W,
}

impl<W: Write> DkvpWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the underlying sink (e.g. a byte buffer in tests).
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordWriter for DkvpWriter<W> {
    fn write(&mut self, record: &Record, context: &Context) -> StreamResult<()> {
        let mut line = String::new();
        let mut first = true;
        for (key, value) in record {
            if value.is_absent() {
                continue;
            }
            if !first {
                line.push_str(&context.ofs);
            }
            first = false;
            line.push_str(key);
            line.push_str(&context.ops);
            line.push_str(&value.to_string());
        }
        line.push_str(&context.ors);
        self.out.write_all(line.as_bytes())?;
        Ok(())
    }

    fn finish(&mut self, _context: &Context) -> StreamResult<()> {
        self.out.flush()?;
        Ok(())
    }
}
