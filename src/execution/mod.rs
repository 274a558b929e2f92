//! Pipeline engine: runs reader -> verbs -> writer over bounded channels.
//!
//! The pipeline is a linear chain. The reader and each transformer run as
//! independent named threads communicating over bounded single-producer /
//! single-consumer channels; the writer runs on the calling thread. The
//! channel capacity is a small constant: enough for pipelining, small
//! enough that a slow consumer exerts backpressure on the whole chain.
//!
//! End-of-stream is an in-band marker envelope rather than channel
//! disconnection, so the marker can carry the stream's final counters.
//! Each stage forwards it exactly once and stops; nothing is emitted after
//! it. Each stage preserves the order of envelopes it emits relative to
//! the order received, unless the verb's contract reorders (group-by is
//! the canonical reorderer).
//!
//! Envelopes transfer ownership of their record from sender to receiver;
//! no state is shared between stages.

mod observer;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::bounded;

use crate::error::{StreamError, StreamResult};
use crate::ingestion::RecordReader;
use crate::output::RecordWriter;
use crate::processing::RecordTransformer;
use crate::types::{Context, Envelope};

pub use observer::{
    CompositeStreamObserver, StdErrStreamObserver, StreamEvent, StreamMetrics,
    StreamMetricsSnapshot, StreamObserver,
};

/// Configuration for the [`StreamEngine`].
#[derive(Clone)]
pub struct StreamEngineOptions {
    /// Capacity of each inter-stage channel.
    pub channel_capacity: usize,
    /// Optional observer for run events (metrics/logging).
    pub observer: Option<Arc<dyn StreamObserver>>,
}

impl Default for StreamEngineOptions {
    fn default() -> Self {
        Self {
            channel_capacity: 1,
            observer: None,
        }
    }
}

impl fmt::Debug for StreamEngineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamEngineOptions")
            .field("channel_capacity", &self.channel_capacity)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

/// Drives a record stream through a chain of transformers.
pub struct StreamEngine {
    opts: StreamEngineOptions,
    metrics: Arc<StreamMetrics>,
    stop: Arc<AtomicBool>,
}

impl StreamEngine {
    /// Create a new engine with the given options.
    ///
    /// # Panics
    ///
    /// Panics if `channel_capacity == 0`.
    pub fn new(opts: StreamEngineOptions) -> Self {
        assert!(opts.channel_capacity > 0, "channel_capacity must be > 0");
        Self {
            opts,
            metrics: Arc::new(StreamMetrics::new()),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle to real-time run metrics.
    pub fn metrics(&self) -> Arc<StreamMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Cooperative cancellation handle.
    ///
    /// Setting the flag makes the reader cut the stream and emit the
    /// end-of-stream marker, which drains the chain: buffering verbs flush
    /// and every stage shuts down in order.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Run the stream to completion.
    ///
    /// Reads records from `reader` (stamping `initial_context`'s counters
    /// onto each envelope), passes them through `transformers` in order,
    /// and hands surviving records to `writer`. Returns after the
    /// end-of-stream marker has reached the writer and `writer.finish` has
    /// run, or after the first reader/writer error.
    pub fn run(
        &self,
        mut reader: Box<dyn RecordReader>,
        transformers: Vec<Box<dyn RecordTransformer>>,
        writer: &mut dyn RecordWriter,
        initial_context: Context,
    ) -> StreamResult<()> {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(StreamEvent::RunStarted);

        let run_result: StreamResult<()> = thread::scope(|scope| {
            let capacity = self.opts.channel_capacity;
            let (head_tx, mut input_rx) = bounded::<Envelope>(capacity);

            let stop = Arc::clone(&self.stop);
            let metrics = Arc::clone(&self.metrics);
            let observer = self.opts.observer.clone();
            let mut context = initial_context;
            let reader_handle = thread::Builder::new()
                .name("stream-reader".to_string())
                .spawn_scoped(scope, move || -> StreamResult<()> {
                    let mut read_error: Option<StreamError> = None;
                    loop {
                        if stop.load(Ordering::SeqCst) {
                            if let Some(obs) = observer.as_ref() {
                                obs.on_event(&StreamEvent::ReaderStopped);
                            }
                            break;
                        }
                        match reader.read() {
                            Ok(Some(record)) => {
                                context.bump_record();
                                metrics.on_record_read();
                                if let Some(obs) = observer.as_ref() {
                                    obs.on_event(&StreamEvent::RecordRead { nr: context.nr });
                                }
                                if head_tx
                                    .send(Envelope::record(record, context.clone()))
                                    .is_err()
                                {
                                    // Downstream went away; the run is ending.
                                    break;
                                }
                            }
                            Ok(None) => break,
                            Err(e) => {
                                read_error = Some(e);
                                break;
                            }
                        }
                    }
                    // Exactly one marker, even on the error path, so
                    // buffering verbs downstream still flush and stop.
                    let _ = head_tx.send(Envelope::end_of_stream(context));
                    match read_error {
                        Some(e) => Err(e),
                        None => Ok(()),
                    }
                })
                .expect("failed to spawn reader thread");

            for (index, mut transformer) in transformers.into_iter().enumerate() {
                let (tx, next_rx) = bounded::<Envelope>(capacity);
                let input = input_rx;
                input_rx = next_rx;
                thread::Builder::new()
                    .name(format!("stream-verb-{index}"))
                    .spawn_scoped(scope, move || loop {
                        let Ok(envelope) = input.recv() else { break };
                        let at_end = envelope.end_of_stream;
                        transformer.transform(envelope, &tx);
                        if at_end {
                            break;
                        }
                    })
                    .expect("failed to spawn transformer thread");
            }

            let mut writer_result: StreamResult<()> = Ok(());
            loop {
                let Ok(envelope) = input_rx.recv() else { break };
                if envelope.end_of_stream {
                    self.metrics.on_end_of_stream();
                    self.emit(StreamEvent::EndOfStreamReached);
                    writer_result = writer.finish(&envelope.context);
                    break;
                }
                match writer.write(&envelope.record, &envelope.context) {
                    Ok(()) => {
                        self.metrics.on_record_written();
                        self.emit(StreamEvent::RecordWritten);
                    }
                    Err(e) => {
                        writer_result = Err(e);
                        self.stop.store(true, Ordering::SeqCst);
                        break;
                    }
                }
            }

            // Unblock any stage still sending toward the writer before the
            // scope joins the worker threads.
            drop(input_rx);
            let reader_result = reader_handle.join().expect("reader thread panicked");
            reader_result.and(writer_result)
        });

        match run_result {
            Ok(()) => {
                self.metrics.end_run(start.elapsed());
                self.emit(StreamEvent::RunFinished {
                    elapsed: start.elapsed(),
                    metrics: self.metrics.snapshot(),
                });
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn emit(&self, event: StreamEvent) {
        if let Some(obs) = &self.opts.observer {
            obs.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::{Arc, Mutex};

    use super::{StreamEngine, StreamEngineOptions, StreamEvent, StreamObserver};
    use crate::error::StreamResult;
    use crate::ingestion::RecordReader;
    use crate::output::CollectWriter;
    use crate::processing::{FillEmptyTransformer, GroupByTransformer, RecordTransformer};
    use crate::types::{Context, Record, Value};

    #[derive(Debug)]
    struct VecReader {
        records: std::vec::IntoIter<Record>,
    }

    impl VecReader {
        fn new(records: Vec<Record>) -> Self {
            Self {
                records: records.into_iter(),
            }
        }
    }

    impl RecordReader for VecReader {
        fn read(&mut self) -> StreamResult<Option<Record>> {
            Ok(self.records.next())
        }
    }

    fn record(pairs: &[(&str, &str)]) -> Record {
        let mut r = Record::new();
        for (k, v) in pairs {
            r.put(*k, Value::from_inferred_text_for_data_files(v));
        }
        r
    }

    #[test]
    fn stateless_chain_preserves_count_and_order() {
        let engine = StreamEngine::new(StreamEngineOptions::default());
        let mut writer = CollectWriter::default();
        let records = vec![
            record(&[("a", "1"), ("b", "")]),
            record(&[("a", ""), ("b", "2")]),
            record(&[("a", "3"), ("b", "4")]),
        ];
        let chain: Vec<Box<dyn RecordTransformer>> =
            vec![Box::new(FillEmptyTransformer::new("N/A"))];

        engine
            .run(
                Box::new(VecReader::new(records)),
                chain,
                &mut writer,
                Context::default(),
            )
            .unwrap();

        assert_eq!(writer.records.len(), 3);
        assert_eq!(
            writer.records[0].get("b"),
            Some(&Value::from_string("N/A"))
        );
        assert_eq!(writer.records[2].get("a"), Some(&Value::from_int(3)));

        let snap = engine.metrics().snapshot();
        assert_eq!(snap.records_read, 3);
        assert_eq!(snap.records_written, 3);
        assert_eq!(snap.end_of_stream_count, 1);
        assert!(snap.elapsed.is_some());
    }

    #[test]
    fn buffering_verb_does_not_deadlock_tiny_channels() {
        // More records than the channel capacity; group-by holds them all
        // until the marker, so the reader must block on backpressure and
        // resume cleanly.
        let engine = StreamEngine::new(StreamEngineOptions {
            channel_capacity: 1,
            observer: None,
        });
        let mut writer = CollectWriter::default();
        let mut records = Vec::new();
        for i in 0..64 {
            let key = if i % 2 == 0 { "even" } else { "odd" };
            records.push(record(&[("k", key), ("v", &i.to_string())]));
        }
        let chain: Vec<Box<dyn RecordTransformer>> =
            vec![Box::new(GroupByTransformer::new(vec!["k".to_string()]))];

        engine
            .run(
                Box::new(VecReader::new(records)),
                chain,
                &mut writer,
                Context::default(),
            )
            .unwrap();

        assert_eq!(writer.records.len(), 64);
        let keys: Vec<&str> = writer
            .records
            .iter()
            .map(|r| r.get("k").unwrap().string_value())
            .collect();
        assert!(keys[..32].iter().all(|k| *k == "even"));
        assert!(keys[32..].iter().all(|k| *k == "odd"));
    }

    #[derive(Default)]
    struct EventLog {
        events: Mutex<Vec<String>>,
    }

    impl StreamObserver for EventLog {
        fn on_event(&self, event: &StreamEvent) {
            let name = match event {
                StreamEvent::RunStarted => "run_started",
                StreamEvent::RecordRead { .. } => "record_read",
                StreamEvent::RecordWritten => "record_written",
                StreamEvent::ReaderStopped => "reader_stopped",
                StreamEvent::EndOfStreamReached => "end_of_stream",
                StreamEvent::RunFinished { .. } => "run_finished",
            };
            self.events.lock().unwrap().push(name.to_string());
        }
    }

    #[test]
    fn observer_sees_run_lifecycle() {
        let log = Arc::new(EventLog::default());
        let engine = StreamEngine::new(StreamEngineOptions {
            channel_capacity: 1,
            observer: Some(log.clone()),
        });
        let mut writer = CollectWriter::default();

        engine
            .run(
                Box::new(VecReader::new(vec![record(&[("a", "1")])])),
                Vec::new(),
                &mut writer,
                Context::default(),
            )
            .unwrap();

        let events = log.events.lock().unwrap();
        assert_eq!(events.first().map(String::as_str), Some("run_started"));
        assert_eq!(events.last().map(String::as_str), Some("run_finished"));
        assert!(events.iter().any(|e| e == "record_read"));
        assert!(events.iter().any(|e| e == "record_written"));
        assert_eq!(events.iter().filter(|e| *e == "end_of_stream").count(), 1);
    }

    #[test]
    fn stop_flag_cuts_the_stream_and_still_drains() {
        #[derive(Debug)]
        struct EndlessReader;
        impl RecordReader for EndlessReader {
            fn read(&mut self) -> StreamResult<Option<Record>> {
                let mut r = Record::new();
                r.put("x", Value::from_int(1));
                Ok(Some(r))
            }
        }

        let engine = StreamEngine::new(StreamEngineOptions::default());
        let stop = engine.stop_handle();
        stop.store(true, Ordering::SeqCst);

        let mut writer = CollectWriter::default();
        engine
            .run(
                Box::new(EndlessReader),
                Vec::new(),
                &mut writer,
                Context::default(),
            )
            .unwrap();

        // The pre-set flag stops the reader before its first record; only
        // the marker flows.
        assert!(writer.records.is_empty());
        assert_eq!(engine.metrics().snapshot().end_of_stream_count, 1);
    }

    #[test]
    #[should_panic(expected = "channel_capacity must be > 0")]
    fn zero_capacity_is_rejected() {
        let _ = StreamEngine::new(StreamEngineOptions {
            channel_capacity: 0,
            observer: None,
        });
    }
}
