use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompareError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompareError {
    /// The input could not be read as a report at all. Never a regression.
    #[error("incompatible {label} report: {reason}")]
    Incompatible { label: String, reason: String },

    #[error("invalid comparison options: {0}")]
    InvalidOptions(String),
}

impl CompareError {
    pub(crate) fn incompatible(label: &str, reason: impl ToString) -> Self {
        CompareError::Incompatible {
            label: label.to_string(),
            reason: reason.to_string(),
        }
    }
}
