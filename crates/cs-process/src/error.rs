use cs_core::{CoreError, ProcessId};
use cs_sync::GateError;
use thiserror::Error;

use crate::ProcessState;

#[derive(Debug, Error)]
pub enum ProcessError {
    /// `op` is not legal for a process in `state`.
    #[error("{op} is not allowed on {id} in state {state}")]
    SchedulingContract {
        id:    ProcessId,
        state: ProcessState,
        op:    &'static str,
    },

    #[error("no process with id {0}")]
    UnknownProcess(ProcessId),

    #[error("no function registered under {0:?}")]
    UnknownFunction(String),

    /// Returned from `unschedule` to a body whose process was killed.
    #[error("{0} was killed")]
    Killed(ProcessId),

    #[error("invalid simulated duration {0}")]
    InvalidDuration(f64),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("failed to start process task: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type ProcessResult<T> = Result<T, ProcessError>;

/// Why a process body's main routine gave up.
#[derive(Debug, Error)]
pub enum BodyError {
    /// A core call made by the body failed, e.g. `unschedule` on a killed process.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Application-level failure.
    #[error("{0}")]
    Failed(String),
}

impl BodyError {
    pub fn msg(message: impl Into<String>) -> Self {
        BodyError::Failed(message.into())
    }
}

pub type BodyResult = Result<(), BodyError>;
