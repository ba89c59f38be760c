use serde::{Deserialize, Serialize};

use super::{CompareError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    LowerIsBetter,
    HigherIsBetter,
}

/// A numeric diagnostic tracked across runs.
///
/// `path` is a dot path into an outcome's diagnostics. Without `test` the rule
/// applies to every test present in both reports that carries the value.
/// `margin` is relative: `0.25` tolerates a value up to 25% worse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricRule {
    pub path: String,
    #[serde(default)]
    pub test: Option<String>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_margin")]
    pub margin: f64,
}

fn default_margin() -> f64 {
    0.25
}

impl MetricRule {
    pub fn lower_is_better(path: impl Into<String>, margin: f64) -> Self {
        Self {
            path: path.into(),
            test: None,
            direction: Direction::LowerIsBetter,
            margin,
        }
    }

    pub fn higher_is_better(path: impl Into<String>, margin: f64) -> Self {
        Self {
            direction: Direction::HigherIsBetter,
            ..Self::lower_is_better(path, margin)
        }
    }

    pub fn for_test(mut self, test: impl Into<String>) -> Self {
        self.test = Some(test.into());
        self
    }

    /// Relative change where positive means worse.
    pub(crate) fn worsening(&self, baseline: f64, current: f64) -> Option<f64> {
        if !baseline.is_finite() || !current.is_finite() || baseline == 0.0 {
            return None;
        }
        let change = (current - baseline) / baseline.abs();
        Some(match self.direction {
            Direction::LowerIsBetter => change,
            Direction::HigherIsBetter => -change,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareOptions {
    /// Allowed drop in success rate (as a fraction) before it is a regression.
    pub rate_tolerance: f64,
    pub metrics: Vec<MetricRule>,
}

/// Test name of the built-in benchmark tracked by the default metric rule.
pub const DEFAULT_METRIC_TEST: &str = "performance.benchmark";

impl Default for CompareOptions {
    /// Tracks the built-in benchmark's mean only. Its timings cover
    /// sub-millisecond work and vary between runs, so the margin is wide.
    fn default() -> Self {
        Self {
            rate_tolerance: 0.0,
            metrics: vec![
                MetricRule::lower_is_better("analysis.mean_ms", 0.5).for_test(DEFAULT_METRIC_TEST),
            ],
        }
    }
}

impl CompareOptions {
    pub fn with_rate_tolerance(mut self, rate_tolerance: f64) -> Self {
        self.rate_tolerance = rate_tolerance;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.rate_tolerance.is_finite() || !(0.0..=1.0).contains(&self.rate_tolerance) {
            return Err(CompareError::InvalidOptions(format!(
                "rate_tolerance must be within 0..=1, got {}",
                self.rate_tolerance
            )));
        }
        for rule in &self.metrics {
            if rule.path.trim().is_empty() {
                return Err(CompareError::InvalidOptions(
                    "metric path must not be empty".to_string(),
                ));
            }
            if !rule.margin.is_finite() || rule.margin < 0.0 {
                return Err(CompareError::InvalidOptions(format!(
                    "metric `{}` margin must be a non-negative number",
                    rule.path
                )));
            }
        }
        Ok(())
    }
}
