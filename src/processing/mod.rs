//! The verb layer: record transformers and their argument parsing.
//!
//! A verb is one stage of the stream pipeline. Every verb implements
//! [`RecordTransformer`]: it consumes one [`Envelope`] and emits zero or
//! more envelopes to its output channel, forwarding the end-of-stream
//! marker exactly once (after flushing any buffered state).
//!
//! The three shapes of transformer are each represented here:
//!
//! - per-record stateless: [`flatten`]
//! - per-stream stateful (buffer, then emit at end): [`group_by`], [`seqgen`]
//! - per-field mutating: [`fill_empty`]
//!
//! Each verb also registers a [`VerbSetup`] carrying its name, usage text,
//! argument parser, and whether it ignores input records. The registry
//! parses `verb [options] then verb [options] ...` chains via
//! [`parse_verb_chain`].

pub mod fill_empty;
pub mod flatten;
pub mod group_by;
pub mod seqgen;

pub use fill_empty::{FillEmptyTransformer, DEFAULT_FILL_VALUE};
pub use flatten::FlattenTransformer;
pub use group_by::GroupByTransformer;
pub use seqgen::SeqgenTransformer;

use crate::error::{StreamError, StreamResult};
use crate::types::Envelope;

/// Sending half of the bounded channel between two pipeline stages.
pub type EnvelopeSender = crossbeam_channel::Sender<Envelope>;

/// One stage of the stream pipeline.
///
/// Sends on the output channel may fail only when the downstream stage has
/// disconnected during teardown; transformers treat that as a no-op since
/// the run is already ending.
pub trait RecordTransformer: Send + std::fmt::Debug {
    /// Consume one envelope, emitting zero or more envelopes downstream.
    ///
    /// The end-of-stream marker must be forwarded exactly once, after any
    /// buffered output has been flushed. Nothing may be emitted after it.
    fn transform(&mut self, envelope: Envelope, output: &EnvelopeSender);
}

/// A verb-argument parser: consumes tokens starting at `cursor` (just past
/// the verb name), advances the cursor past everything it used, and returns
/// the constructed transformer.
pub type VerbParser = fn(&[String], &mut usize) -> StreamResult<Box<dyn RecordTransformer>>;

/// Registration metadata for one verb.
pub struct VerbSetup {
    /// The verb name, unique within the registry.
    pub name: &'static str,
    /// Usage text printed for `-h`/`--help` and argument errors.
    pub usage: &'static str,
    /// True for verbs that synthesise records from nothing; such verbs
    /// receive only the end-of-stream envelope and produce data ahead of
    /// it, so no reader needs to run.
    pub ignores_input: bool,
    /// The argument parser.
    pub parse: VerbParser,
}

/// All registered verbs.
pub const VERB_SETUPS: &[VerbSetup] = &[
    fill_empty::FILL_EMPTY_SETUP,
    flatten::FLATTEN_SETUP,
    group_by::GROUP_BY_SETUP,
    seqgen::SEQGEN_SETUP,
];

/// Keyword separating verbs in a chain.
pub const VERB_CHAIN_SEPARATOR: &str = "then";

/// Look up a verb's setup by name.
pub fn verb_setup(name: &str) -> Option<&'static VerbSetup> {
    VERB_SETUPS.iter().find(|setup| setup.name == name)
}

/// Parse `verb [options] then verb [options] ...` into a transformer chain.
pub fn parse_verb_chain(args: &[String]) -> StreamResult<Vec<Box<dyn RecordTransformer>>> {
    let mut transformers = Vec::new();
    let mut cursor = 0;

    loop {
        let name = args.get(cursor).ok_or_else(|| StreamError::Usage {
            verb: "verb chain".to_string(),
            message: "expected a verb name".to_string(),
        })?;
        let setup = verb_setup(name).ok_or_else(|| StreamError::UnknownVerb {
            name: name.clone(),
        })?;
        cursor += 1;

        transformers.push((setup.parse)(args, &mut cursor)?);

        match args.get(cursor) {
            None => return Ok(transformers),
            Some(sep) if sep == VERB_CHAIN_SEPARATOR => cursor += 1,
            Some(other) => {
                return Err(usage_error(
                    setup.name,
                    format!("unexpected argument '{other}'"),
                ));
            }
        }
    }
}

pub(crate) fn usage_error(verb: &str, message: impl Into<String>) -> StreamError {
    StreamError::Usage {
        verb: verb.to_string(),
        message: message.into(),
    }
}

/// Consume an option flag's value. On entry `cursor` points at the flag;
/// on exit it points past the value.
pub(crate) fn take_option_value(
    verb: &str,
    flag: &str,
    args: &[String],
    cursor: &mut usize,
) -> StreamResult<String> {
    match args.get(*cursor + 1) {
        Some(value) => {
            *cursor += 2;
            Ok(value.clone())
        }
        None => Err(usage_error(verb, format!("option {flag} requires a value"))),
    }
}
