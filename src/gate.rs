//! Exit-code gating over a finished run.
//!
//! Gates are evaluated in a fixed priority order and the first one that fires
//! decides the exit code:
//!
//! 1. failed tests (`fail_on_error`)
//! 2. success rate below `min_success_rate` percent
//! 3. incompatible baseline, or a test-set mismatch (`fail_on_mismatch`)
//! 4. regression against the baseline (`fail_on_regression`)

mod error;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compare::{ChangeKind, CompareError, Comparison};
use crate::model::SuiteReport;

pub use error::{GateError, Result};

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILED_TESTS: u8 = 1;
pub const EXIT_LOW_SUCCESS_RATE: u8 = 2;
pub const EXIT_BASELINE_MISMATCH: u8 = 3;
pub const EXIT_REGRESSION: u8 = 4;
pub const EXIT_USAGE: u8 = 64;
pub const EXIT_INPUT: u8 = 65;
pub const EXIT_IO: u8 = 74;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    pub fail_on_error: bool,
    /// Percentage in `0..=100`.
    pub min_success_rate: Option<f64>,
    pub fail_on_mismatch: bool,
    pub fail_on_regression: bool,
    /// Shorthand for gates 1, 3 and 4.
    pub strict: bool,
}

impl GateConfig {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    /// Rejects flag combinations that cannot be evaluated.
    ///
    /// Explicit mismatch or regression gates need a baseline; `strict` alone
    /// does not, it simply degrades to the failed-test gate.
    pub fn validate(&self, has_baseline: bool) -> Result<()> {
        if let Some(rate) = self.min_success_rate {
            if !(0.0..=100.0).contains(&rate) {
                return Err(GateError::InvalidMinSuccessRate(rate));
            }
        }
        if !has_baseline {
            if self.fail_on_mismatch {
                return Err(GateError::RequiresBaseline("--fail-on-mismatch"));
            }
            if self.fail_on_regression {
                return Err(GateError::RequiresBaseline("--fail-on-regression"));
            }
        }
        Ok(())
    }

    pub fn fails_on_error(&self) -> bool {
        self.fail_on_error || self.strict
    }

    pub fn fails_on_mismatch(&self) -> bool {
        self.fail_on_mismatch || self.strict
    }

    pub fn fails_on_regression(&self) -> bool {
        self.fail_on_regression || self.strict
    }

    /// Layer `other` over `self`: toggles are OR-ed, a set threshold wins.
    pub fn merged_with(&self, other: &GateConfig) -> GateConfig {
        GateConfig {
            fail_on_error: self.fail_on_error || other.fail_on_error,
            min_success_rate: other.min_success_rate.or(self.min_success_rate),
            fail_on_mismatch: self.fail_on_mismatch || other.fail_on_mismatch,
            fail_on_regression: self.fail_on_regression || other.fail_on_regression,
            strict: self.strict || other.strict,
        }
    }
}

/// What happened with the baseline, if one was requested.
#[derive(Debug, Clone, Copy)]
pub enum BaselineState<'a> {
    NotRequested,
    Compared(&'a Comparison<'a>),
    Incompatible(&'a CompareError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum GateVerdict {
    Passed,
    FailedTests { failed: usize },
    LowSuccessRate { actual_pct: f64, required_pct: f64 },
    BaselineMismatch { reason: String },
    Regression { rate_delta: f64, metric_regressions: usize },
}

impl GateVerdict {
    pub fn exit_code(&self) -> u8 {
        match self {
            GateVerdict::Passed => EXIT_OK,
            GateVerdict::FailedTests { .. } => EXIT_FAILED_TESTS,
            GateVerdict::LowSuccessRate { .. } => EXIT_LOW_SUCCESS_RATE,
            GateVerdict::BaselineMismatch { .. } => EXIT_BASELINE_MISMATCH,
            GateVerdict::Regression { .. } => EXIT_REGRESSION,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, GateVerdict::Passed)
    }
}

impl fmt::Display for GateVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateVerdict::Passed => write!(f, "all enabled gates satisfied"),
            GateVerdict::FailedTests { failed } => write!(f, "{failed} test(s) failed"),
            GateVerdict::LowSuccessRate {
                actual_pct,
                required_pct,
            } => write!(
                f,
                "success rate {actual_pct:.1}% is below the required {required_pct:.1}%"
            ),
            GateVerdict::BaselineMismatch { reason } => {
                write!(f, "baseline comparison failed: {reason}")
            }
            GateVerdict::Regression {
                rate_delta,
                metric_regressions,
            } => write!(
                f,
                "regression detected (rate delta {:+.2}%, {metric_regressions} metric regression(s))",
                rate_delta * 100.0
            ),
        }
    }
}

pub fn evaluate(
    report: &SuiteReport,
    baseline: BaselineState<'_>,
    gates: &GateConfig,
) -> GateVerdict {
    let summary = &report.test_summary;
    if gates.fails_on_error() && summary.failed > 0 {
        return GateVerdict::FailedTests {
            failed: summary.failed,
        };
    }

    if let Some(required_pct) = gates.min_success_rate {
        // Compare counts so a rate exactly at the threshold passes.
        let below = if summary.total == 0 {
            required_pct > 0.0
        } else {
            (summary.passed as f64) * 100.0 < required_pct * summary.total as f64
        };
        if below {
            let actual_pct = report.success_rate() * 100.0;
            return GateVerdict::LowSuccessRate {
                actual_pct,
                required_pct,
            };
        }
    }

    match baseline {
        BaselineState::NotRequested => GateVerdict::Passed,
        BaselineState::Incompatible(error) => GateVerdict::BaselineMismatch {
            reason: error.to_string(),
        },
        BaselineState::Compared(comparison) => {
            if gates.fails_on_mismatch() && comparison.mismatch() {
                let added = comparison.changes_of(ChangeKind::Added).count();
                let removed = comparison.changes_of(ChangeKind::Removed).count();
                return GateVerdict::BaselineMismatch {
                    reason: format!("{added} test(s) added, {removed} test(s) removed"),
                };
            }
            if gates.fails_on_regression() && comparison.regression {
                return GateVerdict::Regression {
                    rate_delta: comparison.rate_delta,
                    metric_regressions: comparison.metric_regressions.len(),
                };
            }
            GateVerdict::Passed
        }
    }
}
