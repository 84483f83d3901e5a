use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    /// The gate was closed because the context that owns it was torn down.
    #[error("gate {0:?} was torn down")]
    InvalidState(&'static str),
}

pub type GateResult<T> = Result<T, GateError>;
