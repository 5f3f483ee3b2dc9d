use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObserveError {
    #[error("invalid log format: {0} (expected: text|json|journald)")]
    InvalidFormat(String),

    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    #[error("journald is not supported on this platform")]
    JournaldNotSupported,

    #[error("failed to connect to journald: {0}")]
    JournaldInitFailed(String),

    #[error("tracing subscriber already initialized")]
    AlreadyInitialized,

    #[error("cannot open log sink {path}: {source}")]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ObserveResult<T> = Result<T, ObserveError>;
