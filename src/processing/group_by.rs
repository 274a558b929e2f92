//! The `group-by` verb: reorders the stream into contiguous groups.

use indexmap::IndexMap;

use crate::error::{StreamError, StreamResult};
use crate::processing::{usage_error, EnvelopeSender, RecordTransformer, VerbSetup};
use crate::types::Envelope;

const GROUP_BY_VERB: &str = "group-by";

const GROUP_BY_USAGE: &str = "\
Usage: group-by {comma-separated field names}
Outputs records in batches having identical values at the specified field
names. Groups appear in order of first appearance; records within a group
keep their arrival order. Records lacking any of the named fields are
dropped. No output is produced until end of stream.
";

/// Registration for the `group-by` verb.
pub const GROUP_BY_SETUP: VerbSetup = VerbSetup {
    name: GROUP_BY_VERB,
    usage: GROUP_BY_USAGE,
    ignores_input: false,
    parse: parse_group_by,
};

fn parse_group_by(args: &[String], cursor: &mut usize) -> StreamResult<Box<dyn RecordTransformer>> {
    while let Some(arg) = args.get(*cursor) {
        if !arg.starts_with('-') {
            break;
        }
        match arg.as_str() {
            "-h" | "--help" => {
                return Err(StreamError::Help {
                    usage: GROUP_BY_USAGE.to_string(),
                })
            }
            other => {
                return Err(usage_error(
                    GROUP_BY_VERB,
                    format!("unrecognized option '{other}'"),
                ))
            }
        }
    }

    let names = args
        .get(*cursor)
        .ok_or_else(|| usage_error(GROUP_BY_VERB, "expected comma-separated field names"))?;
    *cursor += 1;

    let group_by_field_names = names.split(',').map(String::from).collect();
    Ok(Box::new(GroupByTransformer::new(group_by_field_names)))
}

/// Stateful buffering transformer: holds every record until end of stream,
/// then flushes group by group. Memory is O(total records).
#[derive(Debug)]
pub struct GroupByTransformer {
    group_by_field_names: Vec<String>,
    record_lists_by_group: IndexMap<String, Vec<Envelope>>,
}

impl GroupByTransformer {
    pub fn new(group_by_field_names: Vec<String>) -> Self {
        Self {
            group_by_field_names,
            record_lists_by_group: IndexMap::new(),
        }
    }
}

impl RecordTransformer for GroupByTransformer {
    fn transform(&mut self, envelope: Envelope, output: &EnvelopeSender) {
        if !envelope.end_of_stream {
            // Records that don't have the grouping schema are not part of
            // any group; they are dropped, silently.
            let Some(grouping_key) = envelope
                .record
                .get_selected_values_joined(&self.group_by_field_names)
            else {
                return;
            };

            self.record_lists_by_group
                .entry(grouping_key)
                .or_default()
                .push(envelope);
        } else {
            for (_, group) in std::mem::take(&mut self.record_lists_by_group) {
                for buffered in group {
                    let _ = output.send(buffered);
                }
            }
            let _ = output.send(envelope);
        }
    }
}
