use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{SuiteReport, TestOutcome, TestStatus};

use super::{CompareError, CompareOptions, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Unchanged,
    NewlyPassing,
    NewlyFailing,
    NewlySkipped,
    Added,
    Removed,
}

impl ChangeKind {
    pub fn classify(current: Option<TestStatus>, baseline: Option<TestStatus>) -> Option<Self> {
        match (current, baseline) {
            (None, None) => None,
            (Some(_), None) => Some(ChangeKind::Added),
            (None, Some(_)) => Some(ChangeKind::Removed),
            (Some(now), Some(before)) if now == before => Some(ChangeKind::Unchanged),
            (Some(TestStatus::Passed), Some(_)) => Some(ChangeKind::NewlyPassing),
            (Some(TestStatus::Failed), Some(_)) => Some(ChangeKind::NewlyFailing),
            (Some(TestStatus::Skipped), Some(_)) => Some(ChangeKind::NewlySkipped),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Unchanged => "unchanged",
            ChangeKind::NewlyPassing => "newly_passing",
            ChangeKind::NewlyFailing => "newly_failing",
            ChangeKind::NewlySkipped => "newly_skipped",
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub test: String,
    pub kind: ChangeKind,
    pub baseline: Option<TestStatus>,
    pub current: Option<TestStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRegression {
    pub test: String,
    pub path: String,
    pub baseline: f64,
    pub current: f64,
    /// Relative worsening, e.g. `0.4` for 40% worse.
    pub worsening: f64,
    pub margin: f64,
}

/// Structural diff between a current report and a baseline.
///
/// Both reports are borrowed; the comparison is cheap to rebuild and is not
/// persisted on its own. See [`ComparisonRecord`] for an owned snapshot.
#[derive(Debug, Clone)]
pub struct Comparison<'a> {
    current: &'a SuiteReport,
    baseline: &'a SuiteReport,
    pub changes: Vec<StatusChange>,
    pub unchanged: usize,
    pub rate_delta: f64,
    pub metric_regressions: Vec<MetricRegression>,
    pub regression: bool,
}

impl<'a> Comparison<'a> {
    pub fn current(&self) -> &'a SuiteReport {
        self.current
    }

    pub fn baseline(&self) -> &'a SuiteReport {
        self.baseline
    }

    /// True when the two reports disagree on which tests exist.
    pub fn mismatch(&self) -> bool {
        self.changes
            .iter()
            .any(|change| matches!(change.kind, ChangeKind::Added | ChangeKind::Removed))
    }

    pub fn changes_of(&self, kind: ChangeKind) -> impl Iterator<Item = &StatusChange> {
        self.changes.iter().filter(move |change| change.kind == kind)
    }

    pub fn is_identical(&self) -> bool {
        self.changes.is_empty() && self.rate_delta == 0.0 && self.metric_regressions.is_empty()
    }

    pub fn record(&self) -> ComparisonRecord {
        ComparisonRecord {
            current_timestamp: self.current.timestamp,
            baseline_timestamp: self.baseline.timestamp,
            current_success_rate: self.current.success_rate(),
            baseline_success_rate: self.baseline.success_rate(),
            rate_delta: self.rate_delta,
            unchanged: self.unchanged,
            changes: self.changes.clone(),
            metric_regressions: self.metric_regressions.clone(),
            mismatch: self.mismatch(),
            regression: self.regression,
        }
    }
}

/// Owned, serializable form of a [`Comparison`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub current_timestamp: DateTime<Utc>,
    pub baseline_timestamp: DateTime<Utc>,
    pub current_success_rate: f64,
    pub baseline_success_rate: f64,
    pub rate_delta: f64,
    pub unchanged: usize,
    pub changes: Vec<StatusChange>,
    pub metric_regressions: Vec<MetricRegression>,
    pub mismatch: bool,
    pub regression: bool,
}

/// Parse and validate a serialized report. `label` names the input in errors.
pub fn parse_report(raw: &str, label: &str) -> Result<SuiteReport> {
    let report = serde_json::from_str::<SuiteReport>(raw)
        .map_err(|err| CompareError::incompatible(label, err))?;
    report
        .validate()
        .map_err(|err| CompareError::incompatible(label, err))?;
    Ok(report)
}

pub fn compare_reports<'a>(
    current: &'a SuiteReport,
    baseline: &'a SuiteReport,
    options: &CompareOptions,
) -> Comparison<'a> {
    let rate_delta = current.success_rate() - baseline.success_rate();
    let per_test = !current.is_summary_only() && !baseline.is_summary_only();

    let mut changes = Vec::new();
    let mut unchanged = 0;
    let mut metric_regressions = Vec::new();
    if per_test {
        let baseline_index = index(baseline);
        let current_index = index(current);
        for outcome in &current.test_results {
            let before = baseline_index.get(outcome.name.as_str()).copied();
            match ChangeKind::classify(Some(outcome.status), before.map(|b| b.status)) {
                Some(ChangeKind::Unchanged) => unchanged += 1,
                Some(kind) => changes.push(StatusChange {
                    test: outcome.name.clone(),
                    kind,
                    baseline: before.map(|b| b.status),
                    current: Some(outcome.status),
                }),
                None => {}
            }
            if let Some(before) = before {
                metric_regressions.extend(metric_checks(outcome, before, options));
            }
        }
        for outcome in &baseline.test_results {
            if !current_index.contains_key(outcome.name.as_str()) {
                changes.push(StatusChange {
                    test: outcome.name.clone(),
                    kind: ChangeKind::Removed,
                    baseline: Some(outcome.status),
                    current: None,
                });
            }
        }
    }

    let regression = rate_delta < -options.rate_tolerance || !metric_regressions.is_empty();
    tracing::debug!(
        rate_delta,
        changes = changes.len(),
        metric_regressions = metric_regressions.len(),
        regression,
        "reports compared"
    );
    Comparison {
        current,
        baseline,
        changes,
        unchanged,
        rate_delta,
        metric_regressions,
        regression,
    }
}

/// Parse both inputs and compare them.
pub fn compare_json(
    current_raw: &str,
    baseline_raw: &str,
    options: &CompareOptions,
) -> Result<ComparisonRecord> {
    let current = parse_report(current_raw, "current")?;
    let baseline = parse_report(baseline_raw, "baseline")?;
    Ok(compare_reports(&current, &baseline, options).record())
}

fn index(report: &SuiteReport) -> HashMap<&str, &TestOutcome> {
    report
        .test_results
        .iter()
        .map(|outcome| (outcome.name.as_str(), outcome))
        .collect()
}

fn metric_checks(
    current: &TestOutcome,
    baseline: &TestOutcome,
    options: &CompareOptions,
) -> Vec<MetricRegression> {
    options
        .metrics
        .iter()
        .filter(|rule| rule.test.as_deref().is_none_or(|test| test == current.name))
        .filter_map(|rule| {
            let now = current.diagnostic(&rule.path)?.as_f64()?;
            let before = baseline.diagnostic(&rule.path)?.as_f64()?;
            let worsening = rule.worsening(before, now)?;
            (worsening > rule.margin).then(|| MetricRegression {
                test: current.name.clone(),
                path: rule.path.clone(),
                baseline: before,
                current: now,
                worsening,
                margin: rule.margin,
            })
        })
        .collect()
}
