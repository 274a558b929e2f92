//! DKVP reader: delimited key-value pairs, one record per line.
//!
//! `a=1,b=hello` parses to a two-field record. A pair without the pair
//! separator gets its 1-based position as the key, so `3,4,5` parses to
//! `1=3,2=4,3=5`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::StreamResult;
use crate::ingestion::RecordReader;
use crate::types::{Record, Value};

/// Line-oriented reader for the native key-value pair format.
pub struct DkvpReader<R> {
    input: R,
    ifs: String,
    ips: String,
    line: String,
}

impl<R> std::fmt::Debug for DkvpReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DkvpReader")
            .field("ifs", &self.ifs)
            .field("ips", &self.ips)
            .field("line", &self.line)
            .finish()
    }
}

impl DkvpReader<BufReader<File>> {
    /// Open a DKVP file with the given field and pair separators.
    pub fn from_path(path: impl AsRef<Path>, ifs: &str, ips: &str) -> StreamResult<Self> {
        Ok(Self::from_reader(
            BufReader::new(File::open(path)?),
            ifs,
            ips,
        ))
    }
}

impl<R: BufRead> DkvpReader<R> {
    /// Wrap an existing buffered reader.
    pub fn from_reader(input: R, ifs: &str, ips: &str) -> Self {
        Self {
            input,
            ifs: ifs.to_string(),
            ips: ips.to_string(),
            line: String::new(),
        }
    }
}

impl<R: BufRead + Send> RecordReader for DkvpReader<R> {
    fn read(&mut self) -> StreamResult<Option<Record>> {
        self.line.clear();
        if self.input.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        let line = self.line.trim_end_matches(['\n', '\r']);

        let mut record = Record::new();
        if line.is_empty() {
            return Ok(Some(record));
        }
        for (position, pair) in line.split(self.ifs.as_str()).enumerate() {
            match pair.split_once(self.ips.as_str()) {
                Some((key, value)) => {
                    record.put(key, Value::from_inferred_text_for_data_files(value));
                }
                None => {
                    record.put(
                        (position + 1).to_string(),
                        Value::from_inferred_text_for_data_files(pair),
                    );
                }
            }
        }
        Ok(Some(record))
    }
}
