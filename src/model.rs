mod error;
mod outcome;
mod report;
mod status;

#[cfg(test)]
mod tests;

pub use error::{ModelError, Result};
pub use outcome::{Diagnostics, TestOutcome};
pub use report::{SuiteReport, TestSummary};
pub use status::{TestCategory, TestStatus};
