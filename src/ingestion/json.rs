//! JSON reader.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single JSON object
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! JSON is typed, so values bypass text inference: numbers map to
//! INT/FLOAT, booleans to BOOL, `null` to VOID, and nested objects/arrays
//! become MAP/ARRAY values (ready for the `flatten` verb).

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use crate::error::{StreamError, StreamResult};
use crate::ingestion::RecordReader;
use crate::types::{Record, Value};

/// Reader over pre-parsed JSON records.
#[derive(Debug)]
pub struct JsonRecordReader {
    pending: VecDeque<serde_json::Value>,
    consumed: u64,
}

impl JsonRecordReader {
    /// Read and parse an entire JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> StreamResult<Self> {
        Self::from_str(&fs::read_to_string(path)?)
    }

    /// Parse JSON input from an in-memory string.
    pub fn from_str(input: &str) -> StreamResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Self {
                pending: VecDeque::new(),
                consumed: 0,
            });
        }

        // First try parsing as a single JSON value (array or object).
        let pending = if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
            match v {
                serde_json::Value::Array(items) => items.into(),
                obj @ serde_json::Value::Object(_) => VecDeque::from([obj]),
                _ => {
                    return Err(StreamError::InvalidRecord {
                        line: 1,
                        message: "json input must be an object, an array of objects, or NDJSON"
                            .to_string(),
                    })
                }
            }
        } else {
            // Fall back to NDJSON.
            let mut values = VecDeque::new();
            for (i, line) in trimmed.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
                    StreamError::InvalidRecord {
                        line: (i + 1) as u64,
                        message: format!("invalid ndjson: {e}"),
                    }
                })?;
                values.push_back(v);
            }
            values
        };

        Ok(Self {
            pending,
            consumed: 0,
        })
    }
}

impl RecordReader for JsonRecordReader {
    fn read(&mut self) -> StreamResult<Option<Record>> {
        let Some(v) = self.pending.pop_front() else {
            return Ok(None);
        };
        self.consumed += 1;
        match v {
            serde_json::Value::Object(map) => Ok(Some(record_from_json_object(map))),
            other => Err(StreamError::InvalidRecord {
                line: self.consumed,
                message: format!("json record is not an object: {other}"),
            }),
        }
    }
}

fn record_from_json_object(map: serde_json::Map<String, serde_json::Value>) -> Record {
    let mut record = Record::new();
    for (key, value) in map {
        record.put(key, value_from_json(value));
    }
    record
}

/// Map a parsed JSON value into the record value model.
pub fn value_from_json(v: serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Void,
        serde_json::Value::Bool(b) => Value::from_bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::from_int(i),
            None => Value::from_float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::from_string(s),
        serde_json::Value::Array(items) => {
            Value::from_array(items.into_iter().map(value_from_json).collect())
        }
        serde_json::Value::Object(map) => Value::from_map(record_from_json_object(map)),
    }
}
