use thiserror::Error;

/// Convenience result type for stream operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Error type returned across the crate.
///
/// This is a single error enum shared by readers, writers, verb-argument
/// parsing, and the pipeline engine.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON read/write error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An input record could not be parsed into the record model.
    #[error("invalid record at line {line}: {message}")]
    InvalidRecord { line: u64, message: String },

    /// A reader/writer format could not be determined or honored.
    #[error("format error: {message}")]
    Format { message: String },

    /// A verb name did not match any registered verb.
    #[error("unknown verb '{name}'")]
    UnknownVerb { name: String },

    /// A verb's arguments were malformed.
    ///
    /// Binaries map this to exit code 1 after printing the verb's usage.
    #[error("{verb}: {message}")]
    Usage { verb: String, message: String },

    /// `-h`/`--help` was requested while parsing a verb's arguments.
    ///
    /// Binaries print the carried usage text and exit 0.
    #[error("{usage}")]
    Help { usage: String },
}
