use thiserror::Error;

use crate::compare::CompareError;
use crate::gate::{EXIT_BASELINE_MISMATCH, EXIT_INPUT, EXIT_IO, EXIT_USAGE};
use crate::runtime::AppError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    App(#[from] AppError),

    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) => EXIT_USAGE,
            CliError::App(AppError::Gate(_)) => EXIT_USAGE,
            CliError::App(AppError::Compare(CompareError::Incompatible { .. })) => {
                EXIT_BASELINE_MISMATCH
            }
            CliError::App(AppError::Compare(CompareError::InvalidOptions(_))) => EXIT_USAGE,
            CliError::App(error) if error.is_io() => EXIT_IO,
            CliError::App(_) => EXIT_INPUT,
            CliError::Render(_) | CliError::Output(_) => EXIT_IO,
        }
    }
}
