use std::fs;
use std::path::Path;

use serde_json::json;

use crate::model::{Diagnostics, SuiteReport, TestCategory};

use super::{
    Check, CheckContext, CheckError, CheckSchema, CheckVerdict, ParamSpec, Result,
    get_optional_f64, get_optional_str, get_optional_u64, reject_unknown_params,
};

const DEFAULT_REPORTS_DIR: &str = "qa-reports";
const DEFAULT_PATTERN: &str = "*.json";
const DEFAULT_WINDOW: u64 = 5;

/// Success-rate trend over previously persisted reports.
#[derive(Debug, Clone, Copy)]
pub struct HistoryAnalysisCheck;

impl Check for HistoryAnalysisCheck {
    fn name(&self) -> &'static str {
        "analysis.history"
    }

    fn schema(&self) -> CheckSchema {
        CheckSchema {
            name: self.name().to_string(),
            description: "Analyse the success-rate trend of persisted reports.".to_string(),
            category: TestCategory::Analysis,
            params: vec![
                ParamSpec::optional(
                    "reports_dir",
                    "string",
                    "Directory of saved reports, relative to the workspace (default qa-reports).",
                ),
                ParamSpec::optional("pattern", "string", "File glob (default *.json)."),
                ParamSpec::optional("window", "integer", "Most recent reports to consider (default 5)."),
                ParamSpec::optional(
                    "max_decline",
                    "float",
                    "Fail when the latest rate is below the earlier mean by more than this.",
                ),
            ],
        }
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckVerdict> {
        let params = ctx.params;
        reject_unknown_params(params, &["reports_dir", "pattern", "window", "max_decline"])?;
        let dir = ctx
            .workspace
            .join(get_optional_str(params, "reports_dir")?.unwrap_or(DEFAULT_REPORTS_DIR));
        let pattern = get_optional_str(params, "pattern")?.unwrap_or(DEFAULT_PATTERN);
        let window = get_optional_u64(params, "window", DEFAULT_WINDOW)?.max(1) as usize;
        let max_decline = get_optional_f64(params, "max_decline")?;

        if !dir.is_dir() {
            return Ok(CheckVerdict::skipped(format!(
                "reports directory {} does not exist",
                dir.display()
            )));
        }

        let (mut reports, unreadable) = load_reports(&dir, pattern)?;
        if reports.is_empty() {
            return Ok(CheckVerdict::skipped(format!(
                "no readable reports in {}",
                dir.display()
            )));
        }
        reports.sort_by_key(|report| report.timestamp);
        let recent = &reports[reports.len().saturating_sub(window)..];
        let trend = Trend::from_rates(
            &recent
                .iter()
                .map(SuiteReport::success_rate)
                .collect::<Vec<_>>(),
        );

        let mut diagnostics = Diagnostics::new();
        diagnostics.insert(
            "regression_report".to_string(),
            json!({
                "reports_considered": recent.len(),
                "unreadable": unreadable,
                "success_rates": trend.rates,
                "mean_success_rate": trend.mean,
                "latest_success_rate": trend.latest,
                "latest_delta": trend.latest_delta,
                "declining": trend.latest_delta < 0.0,
            }),
        );

        match max_decline {
            Some(limit) if -trend.latest_delta > limit => Err(CheckError::FailedWithDiagnostics {
                message: format!(
                    "latest success rate {:.4} is {:.4} below the earlier mean (limit {limit})",
                    trend.latest, -trend.latest_delta
                ),
                diagnostics,
            }),
            _ => Ok(CheckVerdict::Passed(diagnostics)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Trend {
    rates: Vec<f64>,
    mean: f64,
    latest: f64,
    /// Latest rate minus the mean of the earlier rates; zero with a single report.
    latest_delta: f64,
}

impl Trend {
    fn from_rates(rates: &[f64]) -> Self {
        let window_mean = mean(rates);
        let (latest, earlier) = match rates.split_last() {
            Some((latest, earlier)) => (*latest, earlier),
            None => (0.0, rates),
        };
        let latest_delta = if earlier.is_empty() {
            0.0
        } else {
            latest - mean(earlier)
        };
        Self {
            rates: rates.to_vec(),
            mean: window_mean,
            latest,
            latest_delta,
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn load_reports(dir: &Path, pattern: &str) -> Result<(Vec<SuiteReport>, usize)> {
    // The directory is matched literally; only `pattern` carries wildcards.
    let pattern = Path::new(&glob::Pattern::escape(&dir.to_string_lossy()))
        .join(pattern)
        .to_string_lossy()
        .to_string();
    let entries = glob::glob(&pattern)
        .map_err(|error| CheckError::InvalidParams(format!("invalid pattern: {error}")))?;

    let mut reports = Vec::new();
    let mut unreadable = 0;
    for path in entries.flatten() {
        let parsed = fs::read_to_string(&path)
            .map_err(|error| error.to_string())
            .and_then(|raw| serde_json::from_str::<SuiteReport>(&raw).map_err(|e| e.to_string()))
            .and_then(|report| report.validate().map(|_| report).map_err(|e| e.to_string()));
        match parsed {
            Ok(report) => reports.push(report),
            Err(reason) => {
                tracing::warn!(path = %path.display(), %reason, "skipping unreadable report");
                unreadable += 1;
            }
        }
    }
    Ok((reports, unreadable))
}

#[cfg(test)]
mod tests {
    use super::Trend;

    #[test]
    fn trend_compares_latest_with_earlier_mean() {
        let trend = Trend::from_rates(&[1.0, 0.8, 0.6]);
        assert!((trend.mean - 0.8).abs() < 1e-12);
        assert_eq!(trend.latest, 0.6);
        assert!((trend.latest_delta + 0.3).abs() < 1e-12);

        let single = Trend::from_rates(&[0.5]);
        assert_eq!(single.latest_delta, 0.0);
    }
}
