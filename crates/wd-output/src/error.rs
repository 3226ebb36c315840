//! Error types for wd-output.

use thiserror::Error;

use wd_core::AgentId;

/// Errors that can occur when writing to or reading from a position sink.
///
/// Write failures are logged by the publisher and never stop the
/// simulation; the engine's in-memory state stays authoritative.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("no position recorded for agent {0}")]
    NotFound(AgentId),

    #[error("sink lock poisoned by a panicked writer")]
    Poisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Alias for `Result<T, SinkError>`.
pub type SinkResult<T> = Result<T, SinkError>;
