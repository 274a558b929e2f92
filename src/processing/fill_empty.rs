//! The `fill-empty` verb: replaces empty field values with a fill string.

use crate::error::{StreamError, StreamResult};
use crate::processing::{
    take_option_value, usage_error, EnvelopeSender, RecordTransformer, VerbSetup,
};
use crate::types::{Envelope, Value};

const FILL_EMPTY_VERB: &str = "fill-empty";

/// Fill string used when `-v` is not given.
pub const DEFAULT_FILL_VALUE: &str = "N/A";

const FILL_EMPTY_USAGE: &str = "\
Usage: fill-empty [options]
Fills empty-string fields with the specified fill-value.
Options:
-v {string} Fill-value: defaults to \"N/A\".
-h, --help  Print this message.
";

/// Registration for the `fill-empty` verb.
pub const FILL_EMPTY_SETUP: VerbSetup = VerbSetup {
    name: FILL_EMPTY_VERB,
    usage: FILL_EMPTY_USAGE,
    ignores_input: false,
    parse: parse_fill_empty,
};

fn parse_fill_empty(
    args: &[String],
    cursor: &mut usize,
) -> StreamResult<Box<dyn RecordTransformer>> {
    let mut fill_string = DEFAULT_FILL_VALUE.to_string();

    while let Some(arg) = args.get(*cursor) {
        if !arg.starts_with('-') {
            break;
        }
        match arg.as_str() {
            "-h" | "--help" => {
                return Err(StreamError::Help {
                    usage: FILL_EMPTY_USAGE.to_string(),
                })
            }
            "-v" => fill_string = take_option_value(FILL_EMPTY_VERB, "-v", args, cursor)?,
            other => {
                return Err(usage_error(
                    FILL_EMPTY_VERB,
                    format!("unrecognized option '{other}'"),
                ))
            }
        }
    }

    Ok(Box::new(FillEmptyTransformer::new(fill_string)))
}

/// Per-field mutating transformer: rewrites empty values in place,
/// preserving field positions. The fill value is constructed once.
#[derive(Debug)]
pub struct FillEmptyTransformer {
    fill_value: Value,
}

impl FillEmptyTransformer {
    pub fn new(fill_string: impl Into<String>) -> Self {
        Self {
            fill_value: Value::from_string(fill_string),
        }
    }
}

impl RecordTransformer for FillEmptyTransformer {
    fn transform(&mut self, mut envelope: Envelope, output: &EnvelopeSender) {
        if !envelope.end_of_stream {
            let fill_value = &self.fill_value;
            envelope.record.for_each_value_mut(|_, value| {
                if value.is_empty() {
                    *value = fill_value.clone();
                }
            });
        }
        let _ = output.send(envelope);
    }
}

#[cfg(test)]
mod tests {
    use super::{FillEmptyTransformer, DEFAULT_FILL_VALUE};
    use crate::processing::RecordTransformer;
    use crate::types::{Context, Envelope, Record, Value};

    #[test]
    fn fills_void_and_empty_string_fields() {
        let mut record = Record::new();
        record.put("a", Value::from_int(1));
        record.put("b", Value::from_string(""));
        record.put("c", Value::Void);

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut verb = FillEmptyTransformer::new(DEFAULT_FILL_VALUE);
        verb.transform(Envelope::record(record, Context::default()), &tx);

        let out = rx.try_recv().unwrap();
        let keys: Vec<&str> = out.record.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(out.record.get("a"), Some(&Value::from_int(1)));
        assert_eq!(out.record.get("b"), Some(&Value::from_string("N/A")));
        assert_eq!(out.record.get("c"), Some(&Value::from_string("N/A")));
    }

    #[test]
    fn custom_fill_value() {
        let mut record = Record::new();
        record.put("a", Value::from_string(""));

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut verb = FillEmptyTransformer::new("X");
        verb.transform(Envelope::record(record, Context::default()), &tx);

        let out = rx.try_recv().unwrap();
        assert_eq!(out.record.get("a"), Some(&Value::from_string("X")));
    }

    #[test]
    fn records_without_empty_fields_pass_through() {
        let mut record = Record::new();
        record.put("a", Value::from_int(0));
        record.put("b", Value::from_string("x"));

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut verb = FillEmptyTransformer::new(DEFAULT_FILL_VALUE);
        verb.transform(Envelope::record(record.clone(), Context::default()), &tx);

        let out = rx.try_recv().unwrap();
        assert_eq!(out.record, record);
    }

    #[test]
    fn forwards_end_of_stream() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut verb = FillEmptyTransformer::new(DEFAULT_FILL_VALUE);
        verb.transform(Envelope::end_of_stream(Context::default()), &tx);
        assert!(rx.try_recv().unwrap().end_of_stream);
    }
}
