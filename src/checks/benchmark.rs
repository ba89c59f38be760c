use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::json;

use crate::model::{Diagnostics, SuiteReport, TestCategory, TestOutcome};

use super::{
    Check, CheckContext, CheckError, CheckSchema, CheckVerdict, ParamSpec, Result,
    get_optional_f64, get_optional_u64, reject_unknown_params,
};

const DEFAULT_ITERATIONS: u64 = 200;
const DEFAULT_WARMUP: u64 = 10;
const DEFAULT_PAYLOAD_TESTS: u64 = 50;

/// Times a serialize/parse/validate cycle of a synthetic report, the same
/// path every persisted report and baseline goes through.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceBenchmarkCheck;

impl Check for PerformanceBenchmarkCheck {
    fn name(&self) -> &'static str {
        "performance.benchmark"
    }

    fn schema(&self) -> CheckSchema {
        CheckSchema {
            name: self.name().to_string(),
            description: "Benchmark report encoding and decoding.".to_string(),
            category: TestCategory::Performance,
            params: vec![
                ParamSpec::optional("iterations", "integer", "Measured iterations (default 200)."),
                ParamSpec::optional("warmup", "integer", "Unmeasured iterations (default 10)."),
                ParamSpec::optional(
                    "payload_tests",
                    "integer",
                    "Outcomes in the synthetic report (default 50).",
                ),
                ParamSpec::optional(
                    "max_mean_ms",
                    "float",
                    "Fail when the mean iteration time exceeds this budget.",
                ),
            ],
        }
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckVerdict> {
        let params = ctx.params;
        reject_unknown_params(
            params,
            &["iterations", "warmup", "payload_tests", "max_mean_ms"],
        )?;
        let iterations = get_optional_u64(params, "iterations", DEFAULT_ITERATIONS)?;
        if iterations == 0 {
            return Err(CheckError::InvalidParams(
                "iterations must be at least 1".to_string(),
            ));
        }
        let warmup = get_optional_u64(params, "warmup", DEFAULT_WARMUP)?;
        let payload_tests = get_optional_u64(params, "payload_tests", DEFAULT_PAYLOAD_TESTS)?;
        let budget = get_optional_f64(params, "max_mean_ms")?;

        let report = synthetic_report(payload_tests as usize)?;
        let report_bytes = serde_json::to_vec(&report)?.len();

        for _ in 0..warmup {
            roundtrip(&report)?;
        }
        let mut samples = Vec::with_capacity(iterations as usize);
        for _ in 0..iterations {
            let started = Instant::now();
            roundtrip(&report)?;
            samples.push(started.elapsed().as_secs_f64() * 1000.0);
        }

        let stats = SampleStats::from_samples(&mut samples);
        let ops_per_sec = if stats.mean_ms > 0.0 {
            1000.0 / stats.mean_ms
        } else {
            0.0
        };

        let mut diagnostics = Diagnostics::new();
        diagnostics.insert(
            "baseline".to_string(),
            json!({ "iterations": iterations, "warmup": warmup, "payload_tests": payload_tests }),
        );
        diagnostics.insert(
            "analysis".to_string(),
            json!({
                "mean_ms": stats.mean_ms,
                "p50_ms": stats.p50_ms,
                "p95_ms": stats.p95_ms,
                "max_ms": stats.max_ms,
                "ops_per_sec": ops_per_sec,
            }),
        );
        diagnostics.insert(
            "quality_metrics".to_string(),
            json!({ "report_bytes": report_bytes }),
        );

        match budget {
            Some(limit) if stats.mean_ms > limit => Err(CheckError::FailedWithDiagnostics {
                message: format!(
                    "mean iteration time {:.3}ms exceeds budget {limit}ms",
                    stats.mean_ms
                ),
                diagnostics,
            }),
            _ => Ok(CheckVerdict::Passed(diagnostics)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SampleStats {
    mean_ms: f64,
    p50_ms: f64,
    p95_ms: f64,
    max_ms: f64,
}

impl SampleStats {
    /// `samples` must be non-empty; it is sorted in place.
    fn from_samples(samples: &mut [f64]) -> Self {
        samples.sort_by(f64::total_cmp);
        let mean_ms = samples.iter().sum::<f64>() / samples.len() as f64;
        Self {
            mean_ms,
            p50_ms: percentile(samples, 0.50),
            p95_ms: percentile(samples, 0.95),
            max_ms: samples.last().copied().unwrap_or_default(),
        }
    }
}

/// Nearest-rank percentile over sorted samples.
fn percentile(sorted: &[f64], fraction: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (fraction * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

fn synthetic_report(tests: usize) -> Result<SuiteReport> {
    let outcomes = (0..tests)
        .map(|index| {
            let name = format!("synthetic.{index:04}");
            let duration = Duration::from_micros(250 + index as u64);
            match index % 10 {
                0 => TestOutcome::failed(name, TestCategory::Integration, duration, "synthetic"),
                1 => TestOutcome::skipped(name, TestCategory::Readiness, duration, "synthetic"),
                _ => {
                    let mut diagnostics = Diagnostics::new();
                    diagnostics.insert(
                        "analysis".to_string(),
                        json!({ "mean_ms": index as f64 * 0.5, "samples": [1, 2, 3] }),
                    );
                    TestOutcome::passed(name, TestCategory::Performance, duration)
                        .with_diagnostics(diagnostics)
                }
            }
        })
        .collect();
    SuiteReport::new(Utc::now(), outcomes, Duration::from_millis(tests as u64))
        .map_err(|error| CheckError::Failed(format!("synthetic report is invalid: {error}")))
}

fn roundtrip(report: &SuiteReport) -> Result<()> {
    let encoded = serde_json::to_string(report)?;
    let decoded: SuiteReport = serde_json::from_str(&encoded)?;
    decoded
        .validate()
        .map_err(|error| CheckError::Failed(format!("decoded report is invalid: {error}")))
}
