use cs_core::CoreError;
use cs_process::ProcessError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    /// The event stream broke begin/end bracketing.
    #[error("malformed deployment: {0}")]
    Malformed(String),

    #[error("deployment parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DeployResult<T> = Result<T, DeployError>;
