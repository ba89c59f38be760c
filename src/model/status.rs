use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Skipped => "skipped",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            TestStatus::Passed => "✔",
            TestStatus::Failed => "✘",
            TestStatus::Skipped => "⊘",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Grouping tag carried by every outcome.
///
/// Reports written by other tools may use tags this build does not know;
/// those load as [`TestCategory::Other`] instead of rejecting the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCategory {
    #[default]
    Integration,
    Performance,
    Monitoring,
    Readiness,
    Analysis,
    Custom,
    #[serde(other)]
    Other,
}

impl TestCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestCategory::Integration => "integration",
            TestCategory::Performance => "performance",
            TestCategory::Monitoring => "monitoring",
            TestCategory::Readiness => "readiness",
            TestCategory::Analysis => "analysis",
            TestCategory::Custom => "custom",
            TestCategory::Other => "other",
        }
    }
}

impl fmt::Display for TestCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
