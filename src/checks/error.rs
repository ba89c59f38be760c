use thiserror::Error;

use crate::model::Diagnostics;

pub type Result<T> = std::result::Result<T, CheckError>;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{0}")]
    Failed(String),

    /// A failure that still has measurements worth keeping in the report.
    #[error("{message}")]
    FailedWithDiagnostics {
        message: String,
        diagnostics: Diagnostics,
    },

    #[error("invalid check parameters: {0}")]
    InvalidParams(String),

    #[error("check I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("check serialization failure: {0}")]
    SerdeJson(#[from] serde_json::Error),
}

impl CheckError {
    pub fn into_parts(self) -> (String, Diagnostics) {
        match self {
            CheckError::FailedWithDiagnostics {
                message,
                diagnostics,
            } => (message, diagnostics),
            other => (other.to_string(), Diagnostics::new()),
        }
    }
}
