//! CSV reader: the header row names the fields of every record.

use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::StreamResult;
use crate::ingestion::RecordReader;
use crate::types::{Record, Value};

/// Streaming CSV reader producing one record per data row.
pub struct CsvRecordReader<R: io::Read> {
    records: csv::StringRecordsIntoIter<R>,
    headers: csv::StringRecord,
}

impl<R: io::Read> std::fmt::Debug for CsvRecordReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvRecordReader")
            .field("headers", &self.headers)
            .finish()
    }
}

impl CsvRecordReader<File> {
    /// Open a CSV file. The first row is the header.
    pub fn from_path(path: impl AsRef<Path>) -> StreamResult<Self> {
        let rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;
        Self::from_csv_reader(rdr)
    }
}

impl<R: io::Read> CsvRecordReader<R> {
    /// Wrap an arbitrary byte source. The first row is the header.
    ///
    /// Rows are allowed to be narrower or wider than the header, matching
    /// the heterogeneous-schema record model.
    pub fn from_reader(input: R) -> StreamResult<Self> {
        Self::from_csv_reader(
            csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .from_reader(input),
        )
    }

    fn from_csv_reader(mut rdr: csv::Reader<R>) -> StreamResult<Self> {
        let headers = rdr.headers()?.clone();
        Ok(Self {
            records: rdr.into_records(),
            headers,
        })
    }
}

impl<R: io::Read + Send> RecordReader for CsvRecordReader<R> {
    fn read(&mut self) -> StreamResult<Option<Record>> {
        let Some(result) = self.records.next() else {
            return Ok(None);
        };
        let row = result?;

        let mut record = Record::new();
        for (index, raw) in row.iter().enumerate() {
            let value = Value::from_inferred_text_for_data_files(raw);
            match self.headers.get(index) {
                Some(name) if !name.is_empty() => record.put(name, value),
                // Rows wider than the header get positional keys.
                _ => record.put((index + 1).to_string(), value),
            }
        }
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::CsvRecordReader;
    use crate::ingestion::RecordReader;
    use crate::types::{Value, ValueKind};

    #[test]
    fn header_names_fields_in_order() {
        let input = "id,name,score\n1,Ada,98.5\n2,Grace,99.0\n";
        let mut r = CsvRecordReader::from_reader(input.as_bytes()).unwrap();

        let first = r.read().unwrap().unwrap();
        let keys: Vec<&str> = first.keys().collect();
        assert_eq!(keys, vec!["id", "name", "score"]);
        assert_eq!(first.get("id").unwrap().kind(), ValueKind::Int);
        assert_eq!(first.get("name").unwrap().kind(), ValueKind::String);
        assert_eq!(first.get("score").unwrap().kind(), ValueKind::Float);

        assert!(r.read().unwrap().is_some());
        assert!(r.read().unwrap().is_none());
    }

    #[test]
    fn empty_cells_are_void() {
        let input = "a,b\n,2\n";
        let mut r = CsvRecordReader::from_reader(input.as_bytes()).unwrap();
        let record = r.read().unwrap().unwrap();
        assert_eq!(record.get("a"), Some(&Value::Void));
    }

    #[test]
    fn narrow_and_wide_rows_follow_the_record_model() {
        let input = "a,b\n1\n1,2,3\n";
        let mut r = CsvRecordReader::from_reader(input.as_bytes()).unwrap();

        let narrow = r.read().unwrap().unwrap();
        let keys: Vec<&str> = narrow.keys().collect();
        assert_eq!(keys, vec!["a"]);

        let wide = r.read().unwrap().unwrap();
        let keys: Vec<&str> = wide.keys().collect();
        assert_eq!(keys, vec!["a", "b", "3"]);
    }

    #[test]
    fn invalid_utf8_errors() {
        let input: &[u8] = b"a,b\n\xff\xfe,2\n";
        let mut r = CsvRecordReader::from_reader(input).unwrap();
        assert!(r.read().is_err());
    }
}
