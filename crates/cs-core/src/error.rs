//! Framework error type.
//!
//! Sub-crates define their own error enums (`GateError`, `ProcessError`, …)
//! and wrap the layer below via `#[from]`.  `CoreError` covers the few
//! failures that belong to the shared types themselves.

use thiserror::Error;

use crate::ProcessId;

/// The top-level error type for `cs-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("host {0:?} is not known to the engine")]
    UnknownHost(String),

    #[error("process id {0} has already been issued")]
    IdReused(ProcessId),

    #[error("{0} is not a usable process id")]
    InvalidId(ProcessId),

    #[error("process id space is exhausted")]
    IdsExhausted,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `cs-core`.
pub type CoreResult<T> = Result<T, CoreError>;
