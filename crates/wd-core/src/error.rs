//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant where they need to surface it.

use thiserror::Error;

/// The error type for `wd-core` primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid agent id {0:?}: must be non-empty and contain no whitespace")]
    InvalidAgentId(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `wd-core`.
pub type CoreResult<T> = Result<T, CoreError>;
