//! JSON writer: records become an array of objects.

use std::io::Write;

use crate::error::StreamResult;
use crate::output::RecordWriter;
use crate::types::{Context, Record};

/// Writes the stream as one JSON array of objects, preserving field order.
pub struct JsonRecordWriter<W: Write> {
    out: W,
    wrote_any: bool,
}

impl<W: Write> JsonRecordWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            wrote_any: false,
        }
    }

    /// Recover the underlying sink (e.g. a byte buffer in tests).
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordWriter for JsonRecordWriter<W> {
    fn write(&mut self, record: &Record, _context: &Context) -> StreamResult<()> {
        let prefix = if self.wrote_any { ",\n" } else { "[\n" };
        self.wrote_any = true;
        let rendered = serde_json::to_string(&record_to_json(record))?;
        write!(self.out, "{prefix}{rendered}")?;
        Ok(())
    }

    fn finish(&mut self, _context: &Context) -> StreamResult<()> {
        if self.wrote_any {
            writeln!(self.out, "\n]")?;
        } else {
            writeln!(self.out, "[]")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

fn record_to_json(record: &Record) -> serde_json::Value {
    let mut map = serde_json::Map::with_capacity(record.len());
    for (key, value) in record {
        if value.is_absent() {
            continue;
        }
        map.insert(key.to_string(), value.to_json());
    }
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::JsonRecordWriter;
    use crate::output::RecordWriter;
    use crate::types::{Context, Record, Value};

    fn written(records: &[Record]) -> String {
        let mut writer = JsonRecordWriter::new(Vec::new());
        let context = Context::default();
        for r in records {
            writer.write(r, &context).unwrap();
        }
        writer.finish(&context).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn renders_an_array_of_objects_in_field_order() {
        let mut first = Record::new();
        first.put("b", Value::from_int(2));
        first.put("a", Value::from_int(1));
        let mut second = Record::new();
        second.put("c", Value::from_string("x"));

        let out = written(&[first, second]);
        assert_eq!(out, "[\n{\"b\":2,\"a\":1},\n{\"c\":\"x\"}\n]\n");
    }

    #[test]
    fn nested_values_render_as_json_structures() {
        let mut inner = Record::new();
        inner.put("c", Value::from_int(4));
        let mut record = Record::new();
        record.put("a", Value::from_map(inner));
        record.put("xs", Value::from_array(vec![Value::from_int(1)]));

        let out = written(&[record]);
        assert_eq!(out, "[\n{\"a\":{\"c\":4},\"xs\":[1]}\n]\n");
    }

    #[test]
    fn empty_stream_renders_an_empty_array() {
        assert_eq!(written(&[]), "[]\n");
    }
}
