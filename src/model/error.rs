use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("duplicate test name `{0}` in report")]
    DuplicateTest(String),

    #[error("test `{name}` has invalid duration {value}")]
    InvalidDuration { name: String, value: f64 },

    #[error("summary counts do not add up: passed + failed + skipped = {sum}, total = {total}")]
    CountMismatch { total: usize, sum: usize },

    #[error("summary field `{field}` is {summary} but test_results contain {actual}")]
    SummaryMismatch {
        field: &'static str,
        summary: usize,
        actual: usize,
    },

    #[error("success_rate {reported} does not match passed/total = {expected}")]
    InvalidSuccessRate { reported: f64, expected: f64 },

    #[error("summary duration {0} is not a finite non-negative number")]
    InvalidSummaryDuration(f64),
}
