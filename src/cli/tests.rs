use std::time::Duration;

use chrono::{TimeZone, Utc};
use clap::Parser;
use serde_json::Value;

use crate::compare::{CompareOptions, compare_reports, parse_report};
use crate::gate::{BaselineState, GateConfig, evaluate};
use crate::model::{SuiteReport, TestCategory, TestOutcome};
use crate::runtime::AppError;

use super::CliError;
use super::render::{render_json, render_text};
use super::types::{Cli, Commands, OutputFormat, parse_percentage};

fn sample_report() -> SuiteReport {
    let duration = Duration::from_millis(200);
    let outcomes = vec![
        TestOutcome::passed("startup", TestCategory::Integration, duration),
        TestOutcome::passed("wiring", TestCategory::Integration, duration),
        TestOutcome::failed("bridge", TestCategory::Monitoring, duration, "timeout"),
        TestOutcome::passed("benchmark", TestCategory::Performance, duration),
        TestOutcome::passed("readiness", TestCategory::Readiness, duration),
    ];
    let timestamp = Utc
        .with_ymd_and_hms(2026, 10, 17, 12, 0, 0)
        .single()
        .expect("timestamp");
    SuiteReport::new(timestamp, outcomes, Duration::from_millis(1250)).expect("report")
}

#[test]
fn parses_run_flags() {
    let cli = Cli::try_parse_from([
        "integration-qa",
        "run",
        "--detailed",
        "--format",
        "json",
        "--baseline",
        "old.json",
        "--strict",
        "--min-success-rate",
        "90",
        "-vv",
    ])
    .expect("valid flags");
    assert_eq!(cli.verbose, 2);
    let Commands::Run(args) = cli.command else {
        panic!("expected run command");
    };
    assert!(args.detailed);
    assert_eq!(args.format, OutputFormat::Json);
    let gates = args.gates.to_config();
    assert!(gates.strict);
    assert_eq!(gates.min_success_rate, Some(90.0));
}

#[test]
fn rejects_bad_flags() {
    assert!(Cli::try_parse_from(["integration-qa", "run", "--format", "xml"]).is_err());
    assert!(Cli::try_parse_from(["integration-qa", "run", "--min-success-rate", "101"]).is_err());
    assert!(Cli::try_parse_from(["integration-qa", "compare", "only-one.json"]).is_err());
}

#[test]
fn percentages_accept_a_trailing_sign() {
    assert_eq!(parse_percentage("85%"), Ok(85.0));
    assert_eq!(parse_percentage("0"), Ok(0.0));
    assert!(parse_percentage("-1").is_err());
    assert!(parse_percentage("most").is_err());
}

#[test]
fn exit_codes_follow_error_class() {
    let incompatible = parse_report("nope", "current").expect_err("incompatible");
    assert_eq!(CliError::from(AppError::Compare(incompatible)).exit_code(), 3);
    assert_eq!(CliError::Usage("bad".to_string()).exit_code(), 64);
    let io = AppError::Io {
        path: "report.json".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    };
    assert_eq!(CliError::from(io).exit_code(), 74);
    let gate = GateConfig {
        fail_on_mismatch: true,
        ..GateConfig::default()
    }
    .validate(false)
    .expect_err("needs baseline");
    assert_eq!(CliError::from(AppError::from(gate)).exit_code(), 64);
}

#[test]
fn json_output_hides_results_unless_detailed() {
    let report = sample_report();
    let verdict = evaluate(&report, BaselineState::NotRequested, &GateConfig::strict());

    let brief = render_json(&report, false, BaselineState::NotRequested, &verdict).expect("json");
    let brief: Value = serde_json::from_str(&brief).expect("parse");
    assert!(brief.get("test_results").is_none());
    assert_eq!(brief["test_summary"]["failed"], 1);
    assert_eq!(brief["gate"]["verdict"], "failed_tests");
    assert_eq!(brief["gate"]["exit_code"], 1);

    let detailed = render_json(&report, true, BaselineState::NotRequested, &verdict).expect("json");
    let detailed: Value = serde_json::from_str(&detailed).expect("parse");
    assert_eq!(detailed["test_results"].as_array().map(Vec::len), Some(5));
    assert_eq!(detailed["test_results"][2]["error"], "timeout");
}

#[test]
fn text_output_lists_comparison_changes() {
    let report = sample_report();
    let mut baseline = report.clone();
    for outcome in &mut baseline.test_results {
        outcome.status = crate::model::TestStatus::Passed;
        outcome.error = None;
    }
    baseline.test_summary = SuiteReport::new(
        baseline.timestamp,
        baseline.test_results.clone(),
        Duration::from_millis(1000),
    )
    .expect("baseline")
    .test_summary;
    let comparison = compare_reports(&report, &baseline, &CompareOptions::default());
    let state = BaselineState::Compared(&comparison);
    let verdict = evaluate(&report, state, &GateConfig::default());
    let text = render_text(&report, true, state, &verdict);
    assert!(text.contains("success rate 80.0%"), "{text}");
    assert!(text.contains("timeout"), "{text}");
    assert!(text.contains("newly_failing"), "{text}");
    assert!(text.contains("rate delta -20.00%"), "{text}");
    assert!(text.contains("Gate: all enabled gates satisfied (exit 0)"), "{text}");
}
