use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid module id: {0:?}")]
    InvalidModuleId(String),

    #[error("invalid color: {0:?} (expected #RRGGBB)")]
    InvalidColor(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
