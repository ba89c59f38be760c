use std::fmt::Write as _;

use serde_json::{Value, json};

use crate::gate::{BaselineState, GateVerdict};
use crate::model::{SuiteReport, TestStatus};

pub(super) fn render_json(
    report: &SuiteReport,
    detailed: bool,
    baseline: BaselineState<'_>,
    verdict: &GateVerdict,
) -> serde_json::Result<String> {
    let mut value = if detailed {
        serde_json::to_value(report)?
    } else {
        serde_json::to_value(report.summary_only())?
    };
    if let Value::Object(map) = &mut value {
        match baseline {
            BaselineState::NotRequested => {}
            BaselineState::Compared(comparison) => {
                map.insert(
                    "comparison".to_string(),
                    serde_json::to_value(comparison.record())?,
                );
            }
            BaselineState::Incompatible(error) => {
                map.insert(
                    "comparison".to_string(),
                    json!({"incompatible": true, "error": error.to_string()}),
                );
            }
        }
        let mut gate = serde_json::to_value(verdict)?;
        if let Value::Object(gate) = &mut gate {
            gate.insert("exit_code".to_string(), json!(verdict.exit_code()));
            gate.insert("message".to_string(), json!(verdict.to_string()));
        }
        map.insert("gate".to_string(), gate);
    }
    serde_json::to_string_pretty(&value)
}

pub(super) fn render_text(
    report: &SuiteReport,
    detailed: bool,
    baseline: BaselineState<'_>,
    verdict: &GateVerdict,
) -> String {
    let summary = &report.test_summary;
    let mut out = String::new();
    let _ = writeln!(out, "Integration QA report ({})", report.timestamp.to_rfc3339());
    let _ = writeln!(
        out,
        "  total {}  passed {}  failed {}  skipped {}",
        summary.total, summary.passed, summary.failed, summary.skipped
    );
    let _ = writeln!(
        out,
        "  success rate {:.1}%  duration {:.3}s",
        summary.success_rate * 100.0,
        summary.duration
    );

    if detailed && !report.test_results.is_empty() {
        let _ = writeln!(out);
        for outcome in &report.test_results {
            let _ = write!(
                out,
                "  {} {:<32} {:<12} {:>8.3}s",
                outcome.status.icon(),
                outcome.name,
                outcome.category.as_str(),
                outcome.duration
            );
            match outcome.status {
                TestStatus::Failed => {
                    let _ = write!(out, "  {}", outcome.error.as_deref().unwrap_or("failed"));
                }
                TestStatus::Skipped => {
                    if let Some(reason) = outcome.skip_reason() {
                        let _ = write!(out, "  {reason}");
                    }
                }
                TestStatus::Passed => {}
            }
            let _ = writeln!(out);
        }
    } else if summary.failed > 0 {
        let _ = writeln!(out);
        for outcome in report.failures() {
            let _ = writeln!(
                out,
                "  {} {}: {}",
                outcome.status.icon(),
                outcome.name,
                outcome.error.as_deref().unwrap_or("failed")
            );
        }
    }

    match baseline {
        BaselineState::NotRequested => {}
        BaselineState::Compared(comparison) => {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Baseline ({}): rate delta {:+.2}%  unchanged {}  changed {}",
                comparison.baseline().timestamp.to_rfc3339(),
                comparison.rate_delta * 100.0,
                comparison.unchanged,
                comparison.changes.len()
            );
            for change in &comparison.changes {
                let _ = writeln!(
                    out,
                    "  {:<14} {} ({} -> {})",
                    change.kind.as_str(),
                    change.test,
                    change.baseline.map_or("-", |status| status.as_str()),
                    change.current.map_or("-", |status| status.as_str())
                );
            }
            for metric in &comparison.metric_regressions {
                let _ = writeln!(
                    out,
                    "  metric         {} {}: {} -> {} ({:+.1}%, margin {:.1}%)",
                    metric.test,
                    metric.path,
                    metric.baseline,
                    metric.current,
                    metric.worsening * 100.0,
                    metric.margin * 100.0
                );
            }
            if comparison.regression {
                let _ = writeln!(out, "  regression detected");
            }
        }
        BaselineState::Incompatible(error) => {
            let _ = writeln!(out);
            let _ = writeln!(out, "Baseline: {error}");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Gate: {verdict} (exit {})", verdict.exit_code());
    out
}
