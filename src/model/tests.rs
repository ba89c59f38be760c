use std::time::Duration;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use serde_json::json;

use super::{Diagnostics, ModelError, SuiteReport, TestCategory, TestOutcome, TestStatus};

fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[test]
fn summary_partitions_outcomes_by_status() {
    let outcomes = vec![
        TestOutcome::passed("wiring", TestCategory::Integration, ms(10)),
        TestOutcome::passed("benchmark", TestCategory::Performance, ms(20)),
        TestOutcome::passed("history", TestCategory::Analysis, ms(5)),
        TestOutcome::passed("readiness", TestCategory::Readiness, ms(5)),
        TestOutcome::failed("deploy", TestCategory::Monitoring, ms(30), "timeout"),
    ];
    let report = SuiteReport::new(fixed_time(), outcomes, ms(70)).expect("report");
    let summary = &report.test_summary;
    assert_eq!(summary.total, 5);
    assert_eq!(summary.passed, 4);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 0);
    assert!((summary.success_rate - 0.8).abs() < 1e-12);
    assert!(report.has_failures());
    assert_eq!(
        report.failures().next().and_then(|o| o.error.as_deref()),
        Some("timeout")
    );
}

#[test]
fn empty_run_reports_zero_success_rate() {
    let report = SuiteReport::new(fixed_time(), Vec::new(), Duration::ZERO).expect("report");
    assert_eq!(report.test_summary.total, 0);
    assert_eq!(report.test_summary.success_rate, 0.0);
    assert!(!report.is_summary_only());
}

#[test]
fn duplicate_names_are_rejected() {
    let outcomes = vec![
        TestOutcome::passed("same", TestCategory::Integration, ms(1)),
        TestOutcome::failed("same", TestCategory::Integration, ms(1), "boom"),
    ];
    let error = SuiteReport::new(fixed_time(), outcomes, ms(2)).expect_err("duplicate");
    assert!(matches!(error, ModelError::DuplicateTest(name) if name == "same"));
}

#[test]
fn validate_detects_tampered_summary() {
    let outcomes = vec![
        TestOutcome::passed("a", TestCategory::Integration, ms(1)),
        TestOutcome::failed("b", TestCategory::Integration, ms(1), "boom"),
    ];
    let mut report = SuiteReport::new(fixed_time(), outcomes, ms(2)).expect("report");
    report.test_summary.passed = 2;
    report.test_summary.failed = 0;
    report.test_summary.success_rate = 1.0;
    let error = report.validate().expect_err("mismatch");
    assert!(matches!(
        error,
        ModelError::SummaryMismatch {
            field: "passed",
            summary: 2,
            actual: 1
        }
    ));

    let mut summary_only = report.summary_only();
    summary_only.test_summary.total = 7;
    assert!(matches!(
        summary_only.validate(),
        Err(ModelError::CountMismatch { total: 7, sum: 2 })
    ));
}

#[test]
fn report_json_layout_is_stable() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.insert("analysis".to_string(), json!({"mean_ms": 1.5}));
    let outcomes = vec![
        TestOutcome::passed("benchmark", TestCategory::Performance, ms(250))
            .with_diagnostics(diagnostics),
        TestOutcome::skipped("history", TestCategory::Analysis, ms(0), "no reports"),
    ];
    let report = SuiteReport::new(fixed_time(), outcomes, ms(250)).expect("report");
    let value = serde_json::to_value(&report).expect("serialize");

    assert_eq!(value["timestamp"], json!("2026-10-17T12:00:00Z"));
    let summary = value["test_summary"].as_object().expect("summary object");
    let mut keys = summary.keys().cloned().collect::<Vec<_>>();
    keys.sort();
    assert_eq!(
        keys,
        ["duration", "failed", "passed", "skipped", "success_rate", "total"]
    );

    let first = &value["test_results"][0];
    assert_eq!(first["name"], json!("benchmark"));
    assert_eq!(first["category"], json!("performance"));
    assert_eq!(first["status"], json!("passed"));
    assert_eq!(first["error"], json!(null));
    assert_eq!(first["duration"], json!(0.25));
    assert_eq!(first["analysis"]["mean_ms"], json!(1.5));

    let restored: SuiteReport = serde_json::from_value(value).expect("deserialize");
    assert_eq!(restored, report);
    assert_eq!(
        restored.outcome("history").and_then(TestOutcome::skip_reason),
        Some("no reports")
    );
}

#[test]
fn summary_only_reports_omit_results() {
    let outcomes = vec![TestOutcome::passed("a", TestCategory::Integration, ms(1))];
    let report = SuiteReport::new(fixed_time(), outcomes, ms(1)).expect("report");
    let value = serde_json::to_value(report.summary_only()).expect("serialize");
    assert!(value.get("test_results").is_none());

    let restored: SuiteReport = serde_json::from_value(value).expect("deserialize");
    assert!(restored.is_summary_only());
    assert!(restored.validate().is_ok());
}

#[test]
fn unknown_category_loads_as_other() {
    let raw = json!({
        "name": "legacy",
        "category": "link_processor",
        "duration": 1,
        "status": "failed",
        "error": "not ready",
        "quality_metrics": {"score": 3}
    });
    let outcome: TestOutcome = serde_json::from_value(raw).expect("outcome");
    assert_eq!(outcome.category, TestCategory::Other);
    assert_eq!(outcome.status, TestStatus::Failed);
    assert_eq!(outcome.duration, 1.0);
    assert_eq!(outcome.diagnostic("quality_metrics.score"), Some(&json!(3)));
}

#[test]
fn reserved_diagnostic_keys_are_dropped() {
    let mut diagnostics = Diagnostics::new();
    diagnostics.insert("status".to_string(), json!("fake"));
    diagnostics.insert("baseline".to_string(), json!({"iterations": 3}));
    let outcome = TestOutcome::passed("a", TestCategory::Integration, ms(1))
        .with_diagnostics(diagnostics);
    assert!(!outcome.diagnostics.contains_key("status"));
    assert_eq!(outcome.diagnostic("baseline.iterations"), Some(&json!(3)));
}

fn status_strategy() -> impl Strategy<Value = TestStatus> {
    prop_oneof![
        Just(TestStatus::Passed),
        Just(TestStatus::Failed),
        Just(TestStatus::Skipped),
    ]
}

proptest! {
    #[test]
    fn prop_summary_counts_match_outcomes(statuses in prop::collection::vec(status_strategy(), 0..40)) {
        let outcomes = statuses
            .iter()
            .enumerate()
            .map(|(index, status)| {
                let name = format!("t{index}");
                match status {
                    TestStatus::Passed => TestOutcome::passed(name, TestCategory::Integration, ms(1)),
                    TestStatus::Failed => TestOutcome::failed(name, TestCategory::Integration, ms(1), "x"),
                    TestStatus::Skipped => TestOutcome::skipped(name, TestCategory::Integration, ms(1), "y"),
                }
            })
            .collect::<Vec<_>>();
        let report = SuiteReport::new(fixed_time(), outcomes, ms(1)).expect("report");
        let summary = &report.test_summary;
        prop_assert_eq!(summary.passed + summary.failed + summary.skipped, summary.total);
        let expected = if summary.total == 0 { 0.0 } else { summary.passed as f64 / summary.total as f64 };
        prop_assert!((summary.success_rate - expected).abs() < 1e-12);
    }
}
