//! The `flatten` verb: nested maps/arrays to single-level fields.

use std::collections::HashSet;

use crate::error::{StreamError, StreamResult};
use crate::processing::{
    take_option_value, usage_error, EnvelopeSender, RecordTransformer, VerbSetup,
};
use crate::types::Envelope;

const FLATTEN_VERB: &str = "flatten";

const FLATTEN_USAGE: &str = "\
Usage: flatten [options]
Flattens multi-level maps and arrays to single-level fields. Example: a
field named 'a' with value '{\"b\": {\"c\": 4}}' becomes field 'a:b:c' with
value 4.
Options:
-f {a,b,c}  Comma-separated list of field names to flatten (default: all).
-s {string} Separator, defaulting to the stream's flatten separator.
-h, --help  Print this message.
";

/// Registration for the `flatten` verb.
pub const FLATTEN_SETUP: VerbSetup = VerbSetup {
    name: FLATTEN_VERB,
    usage: FLATTEN_USAGE,
    ignores_input: false,
    parse: parse_flatten,
};

fn parse_flatten(args: &[String], cursor: &mut usize) -> StreamResult<Box<dyn RecordTransformer>> {
    let mut o_flat_sep = String::new();
    let mut field_names: Option<Vec<String>> = None;

    while let Some(arg) = args.get(*cursor) {
        if !arg.starts_with('-') {
            break;
        }
        match arg.as_str() {
            "-h" | "--help" => {
                return Err(StreamError::Help {
                    usage: FLATTEN_USAGE.to_string(),
                })
            }
            "-s" => o_flat_sep = take_option_value(FLATTEN_VERB, "-s", args, cursor)?,
            "-f" => {
                let list = take_option_value(FLATTEN_VERB, "-f", args, cursor)?;
                field_names = Some(list.split(',').map(String::from).collect());
            }
            other => {
                return Err(usage_error(
                    FLATTEN_VERB,
                    format!("unrecognized option '{other}'"),
                ))
            }
        }
    }

    Ok(Box::new(FlattenTransformer::new(o_flat_sep, field_names)))
}

/// Stateless per-record transformer flattening nested values into scalar
/// leaves, either for every field or for a configured subset.
#[derive(Debug)]
pub struct FlattenTransformer {
    o_flat_sep: String,
    field_name_set: Option<HashSet<String>>,
}

impl FlattenTransformer {
    /// An empty `o_flat_sep` means "take the separator from the stream
    /// context"; `field_names` of `None` means flatten every field.
    pub fn new(o_flat_sep: impl Into<String>, field_names: Option<Vec<String>>) -> Self {
        Self {
            o_flat_sep: o_flat_sep.into(),
            field_name_set: field_names.map(|names| names.into_iter().collect()),
        }
    }
}

impl RecordTransformer for FlattenTransformer {
    fn transform(&mut self, mut envelope: Envelope, output: &EnvelopeSender) {
        if envelope.end_of_stream {
            let _ = output.send(envelope);
            return;
        }

        let sep: &str = if self.o_flat_sep.is_empty() {
            &envelope.context.oflatsep
        } else {
            &self.o_flat_sep
        };
        match &self.field_name_set {
            Some(set) => envelope.record.flatten_fields(set, sep),
            None => envelope.record.flatten(sep),
        }
        let _ = output.send(envelope);
    }
}

#[cfg(test)]
mod tests {
    use super::FlattenTransformer;
    use crate::processing::RecordTransformer;
    use crate::types::{Context, Envelope, Record, Value};

    fn nested_record() -> Record {
        let mut inner2 = Record::new();
        inner2.put("c", Value::from_int(4));
        let mut inner1 = Record::new();
        inner1.put("b", Value::from_map(inner2));

        let mut record = Record::new();
        record.put("a", Value::from_map(inner1));
        record.put("d", Value::from_int(5));
        record
    }

    #[test]
    fn flattens_all_with_context_separator() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut verb = FlattenTransformer::new("", None);

        verb.transform(Envelope::record(nested_record(), Context::default()), &tx);

        let out = rx.try_recv().unwrap();
        let keys: Vec<&str> = out.record.keys().collect();
        assert_eq!(keys, vec!["a:b:c", "d"]);
        assert_eq!(out.record.get("a:b:c"), Some(&Value::from_int(4)));
    }

    #[test]
    fn separator_override_wins_over_context() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut verb = FlattenTransformer::new(".", None);

        verb.transform(Envelope::record(nested_record(), Context::default()), &tx);

        let out = rx.try_recv().unwrap();
        assert!(out.record.has("a.b.c"));
    }

    #[test]
    fn flattens_only_selected_fields() {
        let mut ma = Record::new();
        ma.put("b", Value::from_int(1));
        let mut mc = Record::new();
        mc.put("d", Value::from_int(2));
        let mut record = Record::new();
        record.put("a", Value::from_map(ma));
        record.put("c", Value::from_map(mc.clone()));

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut verb = FlattenTransformer::new("", Some(vec!["a".to_string()]));
        verb.transform(Envelope::record(record, Context::default()), &tx);

        let out = rx.try_recv().unwrap();
        let keys: Vec<&str> = out.record.keys().collect();
        assert_eq!(keys, vec!["a:b", "c"]);
        assert_eq!(out.record.get("c"), Some(&Value::from_map_copy(&mc)));
    }

    #[test]
    fn forwards_end_of_stream_unchanged() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut verb = FlattenTransformer::new("", None);

        verb.transform(Envelope::end_of_stream(Context::default()), &tx);

        let out = rx.try_recv().unwrap();
        assert!(out.end_of_stream);
    }
}
