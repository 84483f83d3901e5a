use cs_core::CoreError;
use cs_deploy::DeployError;
use cs_process::ProcessError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}

pub type SimResult<T> = Result<T, SimError>;
