use std::time::Duration;

use chrono::{TimeZone, Utc};

use crate::compare::{CompareOptions, compare_reports, parse_report};
use crate::model::{SuiteReport, TestCategory, TestOutcome};

use super::{
    BaselineState, EXIT_BASELINE_MISMATCH, EXIT_FAILED_TESTS, EXIT_LOW_SUCCESS_RATE, EXIT_OK,
    EXIT_REGRESSION, GateConfig, GateError, GateVerdict, evaluate,
};

fn report(passed: &[&str], failed: &[&str]) -> SuiteReport {
    let duration = Duration::from_millis(5);
    let mut outcomes = passed
        .iter()
        .map(|name| TestOutcome::passed(*name, TestCategory::Integration, duration))
        .collect::<Vec<_>>();
    outcomes.extend(
        failed
            .iter()
            .map(|name| TestOutcome::failed(*name, TestCategory::Integration, duration, "timeout")),
    );
    let timestamp = Utc
        .with_ymd_and_hms(2026, 10, 17, 9, 30, 0)
        .single()
        .expect("timestamp");
    SuiteReport::new(timestamp, outcomes, duration).expect("report")
}

#[test]
fn no_gates_means_success_even_with_failures() {
    let current = report(&["a", "b", "c", "d"], &["e"]);
    let verdict = evaluate(&current, BaselineState::NotRequested, &GateConfig::default());
    assert_eq!(verdict, GateVerdict::Passed);
    assert_eq!(verdict.exit_code(), EXIT_OK);
}

#[test]
fn failed_tests_exit_one() {
    let current = report(&["a", "b", "c", "d"], &["e"]);
    let gates = GateConfig {
        fail_on_error: true,
        ..GateConfig::default()
    };
    let verdict = evaluate(&current, BaselineState::NotRequested, &gates);
    assert_eq!(verdict, GateVerdict::FailedTests { failed: 1 });
    assert_eq!(verdict.exit_code(), EXIT_FAILED_TESTS);
}

#[test]
fn low_success_rate_exits_two() {
    let current = report(&["a", "b", "c", "d"], &["e"]);
    let gates = GateConfig {
        min_success_rate: Some(90.0),
        ..GateConfig::default()
    };
    let verdict = evaluate(&current, BaselineState::NotRequested, &gates);
    assert_eq!(verdict.exit_code(), EXIT_LOW_SUCCESS_RATE);

    let lenient = GateConfig {
        min_success_rate: Some(80.0),
        ..GateConfig::default()
    };
    assert!(evaluate(&current, BaselineState::NotRequested, &lenient).is_passed());
}

#[test]
fn rate_exactly_at_threshold_passes() {
    let passed = (0..57).map(|index| format!("p{index}")).collect::<Vec<_>>();
    let failed = (0..43).map(|index| format!("f{index}")).collect::<Vec<_>>();
    let passed = passed.iter().map(String::as_str).collect::<Vec<_>>();
    let failed = failed.iter().map(String::as_str).collect::<Vec<_>>();
    let current = report(&passed, &failed);

    let at = GateConfig {
        min_success_rate: Some(57.0),
        ..GateConfig::default()
    };
    assert!(evaluate(&current, BaselineState::NotRequested, &at).is_passed());

    let above = GateConfig {
        min_success_rate: Some(57.5),
        ..GateConfig::default()
    };
    assert_eq!(
        evaluate(&current, BaselineState::NotRequested, &above).exit_code(),
        EXIT_LOW_SUCCESS_RATE
    );
}

#[test]
fn empty_run_fails_any_positive_threshold() {
    let current = report(&[], &[]);
    let gates = GateConfig {
        min_success_rate: Some(1.0),
        ..GateConfig::default()
    };
    assert_eq!(
        evaluate(&current, BaselineState::NotRequested, &gates).exit_code(),
        EXIT_LOW_SUCCESS_RATE
    );
    let zero = GateConfig {
        min_success_rate: Some(0.0),
        ..GateConfig::default()
    };
    assert!(evaluate(&current, BaselineState::NotRequested, &zero).is_passed());
}

#[test]
fn strict_prefers_failed_tests_over_regression() {
    let current = report(&["a", "b", "c", "d"], &["e"]);
    let baseline = report(&["a", "b", "c", "d", "e"], &[]);
    let comparison = compare_reports(&current, &baseline, &CompareOptions::default());
    assert!(comparison.regression);
    let verdict = evaluate(
        &current,
        BaselineState::Compared(&comparison),
        &GateConfig::strict(),
    );
    assert_eq!(verdict.exit_code(), EXIT_FAILED_TESTS);
}

#[test]
fn regression_exits_four_when_enabled() {
    let current = report(&["a", "b", "c"], &["d"]);
    let baseline = report(&["a", "b", "c", "d"], &[]);
    let comparison = compare_reports(&current, &baseline, &CompareOptions::default());
    let gates = GateConfig {
        fail_on_regression: true,
        ..GateConfig::default()
    };
    let verdict = evaluate(&current, BaselineState::Compared(&comparison), &gates);
    assert!(matches!(verdict, GateVerdict::Regression { rate_delta, .. } if rate_delta < 0.0));
    assert_eq!(verdict.exit_code(), EXIT_REGRESSION);

    let off = evaluate(
        &current,
        BaselineState::Compared(&comparison),
        &GateConfig::default(),
    );
    assert!(off.is_passed());
}

#[test]
fn mismatch_outranks_regression() {
    let current = report(&["a", "new"], &["b"]);
    let baseline = report(&["a", "b", "old"], &[]);
    let comparison = compare_reports(&current, &baseline, &CompareOptions::default());
    let gates = GateConfig {
        fail_on_mismatch: true,
        fail_on_regression: true,
        ..GateConfig::default()
    };
    let verdict = evaluate(&current, BaselineState::Compared(&comparison), &gates);
    assert_eq!(
        verdict,
        GateVerdict::BaselineMismatch {
            reason: "1 test(s) added, 1 test(s) removed".to_string()
        }
    );
}

#[test]
fn incompatible_baseline_is_never_success() {
    let current = report(&["a"], &[]);
    let error = parse_report("not json", "baseline").expect_err("incompatible");
    let verdict = evaluate(
        &current,
        BaselineState::Incompatible(&error),
        &GateConfig::default(),
    );
    assert_eq!(verdict.exit_code(), EXIT_BASELINE_MISMATCH);

    let failing = report(&[], &["a"]);
    let verdict = evaluate(
        &failing,
        BaselineState::Incompatible(&error),
        &GateConfig::strict(),
    );
    assert_eq!(verdict.exit_code(), EXIT_FAILED_TESTS);
}

#[test]
fn validation_rejects_impossible_combinations() {
    let needs_baseline = GateConfig {
        fail_on_regression: true,
        ..GateConfig::default()
    };
    assert_eq!(
        needs_baseline.validate(false),
        Err(GateError::RequiresBaseline("--fail-on-regression"))
    );
    assert!(needs_baseline.validate(true).is_ok());
    assert!(GateConfig::strict().validate(false).is_ok());

    let out_of_range = GateConfig {
        min_success_rate: Some(120.0),
        ..GateConfig::default()
    };
    assert!(matches!(
        out_of_range.validate(true),
        Err(GateError::InvalidMinSuccessRate(_))
    ));
}

#[test]
fn merging_ors_toggles_and_prefers_later_threshold() {
    let config = GateConfig {
        fail_on_error: true,
        min_success_rate: Some(50.0),
        ..GateConfig::default()
    };
    let flags = GateConfig {
        fail_on_regression: true,
        min_success_rate: Some(75.0),
        ..GateConfig::default()
    };
    let merged = config.merged_with(&flags);
    assert!(merged.fail_on_error);
    assert!(merged.fail_on_regression);
    assert_eq!(merged.min_success_rate, Some(75.0));
    assert_eq!(
        config.merged_with(&GateConfig::default()).min_success_rate,
        Some(50.0)
    );
}
