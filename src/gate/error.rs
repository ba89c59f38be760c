use thiserror::Error;

pub type Result<T> = std::result::Result<T, GateError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GateError {
    #[error("minimum success rate must be within 0..=100, got {0}")]
    InvalidMinSuccessRate(f64),

    #[error("{0} requires a baseline report")]
    RequiresBaseline(&'static str),
}
