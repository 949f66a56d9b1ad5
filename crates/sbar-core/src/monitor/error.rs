use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MonitorError {
    /// Recoverable failure; the update is retried after a backoff delay.
    #[error("transient failure: {reason}")]
    Transient { reason: String },

    /// Unrecoverable failure; the task is not retried.
    #[error("fatal failure: {reason}")]
    Fatal { reason: String },
}

impl MonitorError {
    /// Shorthand for [`MonitorError::Transient`].
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`MonitorError::Fatal`].
    pub fn fatal(reason: impl Into<String>) -> Self {
        Self::Fatal {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the task must stop after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }

    /// Detailed reason.
    pub fn reason(&self) -> &str {
        match self {
            Self::Transient { reason } | Self::Fatal { reason } => reason,
        }
    }
}

impl From<std::io::Error> for MonitorError {
    fn from(e: std::io::Error) -> Self {
        MonitorError::transient(e.to_string())
    }
}
