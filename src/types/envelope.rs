//! The unit of flow between pipeline stages.

use crate::types::{Context, Record};

/// A record paired with its stream context, or the end-of-stream marker.
///
/// When `end_of_stream` is true the record is ignored; the envelope's sole
/// purpose is to flush downstream state and carry the final context. Every
/// transformer forwards the marker exactly once, after flushing anything it
/// buffered.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// The record (empty and meaningless on the end-of-stream marker).
    pub record: Record,
    /// Per-stream context as of this record.
    pub context: Context,
    /// True only on the final envelope of a stream.
    pub end_of_stream: bool,
}

impl Envelope {
    /// A data envelope.
    pub fn record(record: Record, context: Context) -> Self {
        Self {
            record,
            context,
            end_of_stream: false,
        }
    }

    /// The end-of-stream marker, carrying final counters.
    pub fn end_of_stream(context: Context) -> Self {
        Self {
            record: Record::new(),
            context,
            end_of_stream: true,
        }
    }
}
