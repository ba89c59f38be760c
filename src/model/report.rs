use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ModelError, Result, TestOutcome, TestStatus};

const RATE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// `passed / total`, or `0.0` for an empty run.
    pub success_rate: f64,
    /// Wall time of the whole run in seconds.
    pub duration: f64,
}

impl TestSummary {
    pub fn from_outcomes(outcomes: &[TestOutcome], duration: Duration) -> Self {
        let count = |status: TestStatus| outcomes.iter().filter(|o| o.status == status).count();
        let passed = count(TestStatus::Passed);
        let total = outcomes.len();
        Self {
            total,
            passed,
            failed: count(TestStatus::Failed),
            skipped: count(TestStatus::Skipped),
            success_rate: success_rate(passed, total),
            duration: duration.as_secs_f64(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let sum = self.passed + self.failed + self.skipped;
        if sum != self.total {
            return Err(ModelError::CountMismatch {
                total: self.total,
                sum,
            });
        }
        let expected = success_rate(self.passed, self.total);
        if !self.success_rate.is_finite() || (self.success_rate - expected).abs() > RATE_EPSILON {
            return Err(ModelError::InvalidSuccessRate {
                reported: self.success_rate,
                expected,
            });
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ModelError::InvalidSummaryDuration(self.duration));
        }
        Ok(())
    }
}

pub(crate) fn success_rate(passed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64
    }
}

/// Result of one full suite execution.
///
/// `test_results` is omitted from the serialized form when empty; a report
/// loaded without it is a summary-only report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuiteReport {
    pub timestamp: DateTime<Utc>,
    pub test_summary: TestSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_results: Vec<TestOutcome>,
}

impl SuiteReport {
    pub fn new(
        timestamp: DateTime<Utc>,
        outcomes: Vec<TestOutcome>,
        duration: Duration,
    ) -> Result<Self> {
        let report = Self {
            timestamp,
            test_summary: TestSummary::from_outcomes(&outcomes, duration),
            test_results: outcomes,
        };
        report.validate()?;
        Ok(report)
    }

    /// Check the summary against the outcomes it claims to describe.
    pub fn validate(&self) -> Result<()> {
        self.test_summary.validate()?;
        if self.test_results.is_empty() {
            return Ok(());
        }

        let mut seen = HashSet::with_capacity(self.test_results.len());
        for outcome in &self.test_results {
            outcome.validate()?;
            if !seen.insert(outcome.name.as_str()) {
                return Err(ModelError::DuplicateTest(outcome.name.clone()));
            }
        }

        let actual = TestSummary::from_outcomes(&self.test_results, Duration::ZERO);
        let checks = [
            ("total", self.test_summary.total, actual.total),
            ("passed", self.test_summary.passed, actual.passed),
            ("failed", self.test_summary.failed, actual.failed),
            ("skipped", self.test_summary.skipped, actual.skipped),
        ];
        for (field, summary, actual) in checks {
            if summary != actual {
                return Err(ModelError::SummaryMismatch {
                    field,
                    summary,
                    actual,
                });
            }
        }
        Ok(())
    }

    pub fn outcome(&self, name: &str) -> Option<&TestOutcome> {
        self.test_results.iter().find(|outcome| outcome.name == name)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TestOutcome> {
        self.test_results
            .iter()
            .filter(|outcome| outcome.status == TestStatus::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.test_summary.failed > 0
    }

    /// Rate recomputed from the counts. A loaded summary may carry a rounded
    /// `success_rate` that is only accurate to within `RATE_EPSILON`.
    pub fn success_rate(&self) -> f64 {
        success_rate(self.test_summary.passed, self.test_summary.total)
    }

    pub fn is_summary_only(&self) -> bool {
        self.test_results.is_empty() && self.test_summary.total > 0
    }

    /// Copy of this report without per-test results.
    pub fn summary_only(&self) -> Self {
        Self {
            timestamp: self.timestamp,
            test_summary: self.test_summary.clone(),
            test_results: Vec::new(),
        }
    }
}
