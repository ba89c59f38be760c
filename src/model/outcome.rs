use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ModelError, Result, TestCategory, TestStatus};

/// Free-form diagnostic payload attached to an outcome, e.g. `baseline`,
/// `analysis`, `regression_report` or `quality_metrics`.
pub type Diagnostics = BTreeMap<String, Value>;

const RESERVED_KEYS: [&str; 5] = ["name", "category", "duration", "status", "error"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestOutcome {
    pub name: String,
    pub category: TestCategory,
    /// Elapsed wall time in seconds.
    pub duration: f64,
    pub status: TestStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten, default, skip_serializing_if = "BTreeMap::is_empty")]
    pub diagnostics: Diagnostics,
}

impl TestOutcome {
    pub fn passed(name: impl Into<String>, category: TestCategory, duration: Duration) -> Self {
        Self::new(name, category, duration, TestStatus::Passed, None)
    }

    pub fn failed(
        name: impl Into<String>,
        category: TestCategory,
        duration: Duration,
        error: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            category,
            duration,
            TestStatus::Failed,
            Some(error.into()),
        )
    }

    /// A skipped outcome keeps its reason under the `skip_reason` diagnostic.
    pub fn skipped(
        name: impl Into<String>,
        category: TestCategory,
        duration: Duration,
        reason: impl Into<String>,
    ) -> Self {
        let mut outcome = Self::new(name, category, duration, TestStatus::Skipped, None);
        outcome
            .diagnostics
            .insert("skip_reason".to_string(), Value::String(reason.into()));
        outcome
    }

    fn new(
        name: impl Into<String>,
        category: TestCategory,
        duration: Duration,
        status: TestStatus,
        error: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            duration: duration.as_secs_f64(),
            status,
            error,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Merge a diagnostic payload. Keys that would shadow the outcome's own
    /// fields in the flattened JSON layout are dropped.
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        for (key, value) in diagnostics {
            if RESERVED_KEYS.contains(&key.as_str()) {
                tracing::warn!(test = %self.name, key = %key, "dropping reserved diagnostic key");
                continue;
            }
            self.diagnostics.insert(key, value);
        }
        self
    }

    /// Look up a nested diagnostic value by dot path, e.g. `analysis.mean_ms`.
    pub fn diagnostic(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let head = segments.next()?;
        let mut current = self.diagnostics.get(head)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn skip_reason(&self) -> Option<&str> {
        self.diagnostics.get("skip_reason").and_then(Value::as_str)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ModelError::InvalidDuration {
                name: self.name.clone(),
                value: self.duration,
            });
        }
        Ok(())
    }
}
