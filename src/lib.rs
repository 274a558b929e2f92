//! `rust-stream-processing` is a stream-oriented processor for tabular and
//! structured data: it reads records from an input source, passes each one
//! through a chain of transformations ("verbs"), and writes the results to
//! an output sink.
//!
//! A record is an insertion-ordered mapping from field names to
//! dynamically-typed values. Field order is preserved through the whole
//! pipeline, and records within one stream may have different field sets.
//!
//! ## What's here
//!
//! - [`types`]: the data plane: [`types::Value`] (tagged polymorphic
//!   scalar/container), [`types::Record`] (insertion-ordered, hash-free
//!   key-to-value container), [`types::Context`] (per-stream separators
//!   and counters), and [`types::Envelope`] (the unit of flow).
//! - [`processing`]: the verb layer: the [`processing::RecordTransformer`]
//!   trait, the verb registry, and the verbs `flatten`, `group-by`,
//!   `fill-empty`, and `seqgen`.
//! - [`execution`]: the pipeline engine running reader -> verbs -> writer as
//!   concurrent stages over bounded channels, with observer/metrics hooks.
//! - [`ingestion`]: record readers (DKVP, CSV, JSON/NDJSON).
//! - [`output`]: record writers (DKVP, CSV, JSON) and an in-memory sink.
//! - [`error`]: the error type shared across the crate.
//!
//! ## Example: records and values
//!
//! ```rust
//! use rust_stream_processing::types::{Record, Value, ValueKind};
//!
//! let mut record = Record::new();
//! record.put("name", Value::from_string("Ada"));
//! record.put("score", Value::from_inferred_text_for_data_files("98.5"));
//!
//! assert_eq!(record.get("score").unwrap().kind(), ValueKind::Float);
//!
//! // Rename preserves field order.
//! record.rename("name", "who");
//! let keys: Vec<&str> = record.keys().collect();
//! assert_eq!(keys, vec!["who", "score"]);
//! ```
//!
//! ## Example: flattening nested structure
//!
//! ```rust
//! use rust_stream_processing::types::{Record, Value};
//!
//! let mut inner = Record::new();
//! inner.put("c", Value::from_int(4));
//! let mut middle = Record::new();
//! middle.put("b", Value::from_map(inner));
//!
//! let mut record = Record::new();
//! record.put("a", Value::from_map(middle));
//! record.flatten(":");
//!
//! assert_eq!(record.get("a:b:c"), Some(&Value::from_int(4)));
//! ```
//!
//! ## Example: an end-to-end pipeline
//!
//! ```rust
//! use rust_stream_processing::execution::{StreamEngine, StreamEngineOptions};
//! use rust_stream_processing::ingestion::DkvpReader;
//! use rust_stream_processing::output::DkvpWriter;
//! use rust_stream_processing::processing::parse_verb_chain;
//! use rust_stream_processing::types::Context;
//!
//! # fn main() -> Result<(), rust_stream_processing::StreamError> {
//! let input = "a=1,b=\na=,b=2\n";
//! let context = Context::default();
//! let reader = DkvpReader::from_reader(input.as_bytes(), &context.ifs, &context.ips);
//!
//! let args: Vec<String> = ["fill-empty", "-v", "X"]
//!     .iter()
//!     .map(|s| s.to_string())
//!     .collect();
//! let chain = parse_verb_chain(&args)?;
//!
//! let engine = StreamEngine::new(StreamEngineOptions::default());
//! let mut writer = DkvpWriter::new(Vec::new());
//! engine.run(Box::new(reader), chain, &mut writer, context)?;
//!
//! let out = String::from_utf8(writer.into_inner()).unwrap();
//! assert_eq!(out, "a=1,b=X\na=X,b=2\n");
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency model
//!
//! Each pipeline stage runs as its own thread; stages hand envelopes to
//! each other over bounded channels, so a slow stage exerts backpressure
//! on everything upstream. End-of-stream is an in-band marker envelope
//! (not channel closure), letting it carry the stream's final counters and
//! trigger stateful verbs to flush. See [`execution`] for details.

pub mod error;
pub mod execution;
pub mod ingestion;
pub mod output;
pub mod processing;
pub mod types;

pub use error::{StreamError, StreamResult};
