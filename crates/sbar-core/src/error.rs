use thiserror::Error;

use sbar_model::{ModelError, ModuleId};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("module already registered: {0}")]
    DuplicateModule(ModuleId),

    #[error("invalid module id: {0}")]
    InvalidModuleId(String),

    #[error("engine already started")]
    AlreadyStarted,

    #[error("invalid engine config: {0}")]
    Config(String),
}

impl From<ModelError> for CoreError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidModuleId(id) => CoreError::InvalidModuleId(id),
            other => CoreError::Config(other.to_string()),
        }
    }
}
