use thiserror::Error;

/// Control-plane request error. Returned synchronously; task state is left untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("no routine with module id {0:?}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Busy(String),
}
