use crate::compare::CompareError;
use crate::config::ConfigError;
use crate::gate::GateError;
use crate::suite::SuiteError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("suite error: {0}")]
    Suite(#[from] SuiteError),

    #[error("{0}")]
    Compare(#[from] CompareError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid gate settings: {0}")]
    Gate(#[from] GateError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// True for unreadable or unwritable files.
    pub fn is_io(&self) -> bool {
        match self {
            AppError::Io { .. } => true,
            AppError::Suite(error) => error.is_io(),
            _ => false,
        }
    }
}
