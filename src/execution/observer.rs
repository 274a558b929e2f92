use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Events emitted by the pipeline engine.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    RunStarted,
    RecordRead { nr: u64 },
    RecordWritten,
    ReaderStopped,
    EndOfStreamReached,
    RunFinished {
        elapsed: Duration,
        metrics: StreamMetricsSnapshot,
    },
}

/// Observer hook for pipeline events.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait StreamObserver: Send + Sync {
    fn on_event(&self, event: &StreamEvent);
}

/// A simple stderr logger for pipeline events.
#[derive(Default)]
pub struct StdErrStreamObserver;

impl StreamObserver for StdErrStreamObserver {
    fn on_event(&self, event: &StreamEvent) {
        eprintln!("{event:?}");
    }
}

/// An observer that fans out events to a list of observers.
#[derive(Default)]
pub struct CompositeStreamObserver {
    observers: Vec<Arc<dyn StreamObserver>>,
}

impl CompositeStreamObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn StreamObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeStreamObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeStreamObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl StreamObserver for CompositeStreamObserver {
    fn on_event(&self, event: &StreamEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

/// Real-time counters for a pipeline run.
///
/// The engine updates these during execution; callers can snapshot them at
/// any time via the handle returned by `StreamEngine::metrics`.
pub struct StreamMetrics {
    run_id: AtomicU64,
    elapsed_ns: AtomicU64,
    records_read: AtomicU64,
    records_written: AtomicU64,
    end_of_stream_count: AtomicU64,
}

impl StreamMetrics {
    pub fn new() -> Self {
        Self {
            run_id: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            records_read: AtomicU64::new(0),
            records_written: AtomicU64::new(0),
            end_of_stream_count: AtomicU64::new(0),
        }
    }

    pub fn begin_run(&self) {
        let _ = self.run_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.elapsed_ns.store(0, Ordering::SeqCst);
        self.records_read.store(0, Ordering::SeqCst);
        self.records_written.store(0, Ordering::SeqCst);
        self.end_of_stream_count.store(0, Ordering::SeqCst);
    }

    pub fn end_run(&self, elapsed: Duration) {
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn on_record_read(&self) {
        let _ = self.records_read.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_record_written(&self) {
        let _ = self.records_written.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_end_of_stream(&self) {
        let _ = self.end_of_stream_count.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> StreamMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        let elapsed = if elapsed_ns > 0 {
            Some(Duration::from_nanos(elapsed_ns))
        } else {
            None
        };

        StreamMetricsSnapshot {
            run_id: self.run_id.load(Ordering::SeqCst),
            elapsed,
            records_read: self.records_read.load(Ordering::SeqCst),
            records_written: self.records_written.load(Ordering::SeqCst),
            end_of_stream_count: self.end_of_stream_count.load(Ordering::SeqCst),
        }
    }
}

impl Default for StreamMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`StreamMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMetricsSnapshot {
    pub run_id: u64,
    pub elapsed: Option<Duration>,
    pub records_read: u64,
    pub records_written: u64,
    pub end_of_stream_count: u64,
}

impl fmt::Display for StreamMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "run_id={}, records_read={}, records_written={}, end_of_stream_count={}, elapsed={:?}",
            self.run_id,
            self.records_read,
            self.records_written,
            self.end_of_stream_count,
            self.elapsed
        )
    }
}
