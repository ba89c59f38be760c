use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde_json::Value;

use crate::checks::{Check, CheckContext, CheckRegistry, CheckVerdict, Resolution};
use crate::model::{SuiteReport, TestCategory, TestOutcome};

use super::{Result, SuiteError, SuiteSpec};

/// A resolved check bound to the test name it reports under.
#[derive(Clone)]
pub struct PlannedCheck {
    pub test_name: String,
    pub category: TestCategory,
    pub check: Arc<dyn Check>,
    pub params: Value,
}

impl PlannedCheck {
    pub fn new(test_name: impl Into<String>, check: Arc<dyn Check>) -> Self {
        Self {
            test_name: test_name.into(),
            category: check.category(),
            check,
            params: Value::Null,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    pub fn with_category(mut self, category: TestCategory) -> Self {
        self.category = category;
        self
    }
}

/// Runs an ordered list of checks one after another.
///
/// A failing, skipping or panicking check only affects its own outcome; the
/// run always continues with the next check.
pub struct SuiteRunner<'r> {
    workspace: PathBuf,
    registry: &'r CheckRegistry,
    checks: Vec<PlannedCheck>,
}

impl<'r> SuiteRunner<'r> {
    pub fn new(
        workspace: impl Into<PathBuf>,
        registry: &'r CheckRegistry,
        checks: Vec<PlannedCheck>,
    ) -> Self {
        Self {
            workspace: workspace.into(),
            registry,
            checks,
        }
    }

    /// Resolve every invocation up front so an unknown check is reported
    /// before anything executes.
    pub fn plan(
        spec: &SuiteSpec,
        registry: &'r CheckRegistry,
        workspace: impl Into<PathBuf>,
    ) -> Result<Self> {
        spec.validate()?;
        let mut checks = Vec::with_capacity(spec.checks.len());
        for invocation in &spec.checks {
            let check = match registry.resolve_with_fallback(&invocation.check, &invocation.fallback)
            {
                Resolution::Found { check, .. } => check,
                Resolution::Missing { tried } => {
                    return Err(SuiteError::UnknownCheck {
                        test: invocation.test_name().to_string(),
                        check: invocation.check.clone(),
                        tried: tried.join(", "),
                    });
                }
            };
            let mut planned = PlannedCheck::new(invocation.test_name(), check)
                .with_params(invocation.params.clone());
            if let Some(category) = invocation.category {
                planned = planned.with_category(category);
            }
            checks.push(planned);
        }
        Ok(Self::new(workspace, registry, checks))
    }

    pub fn checks(&self) -> &[PlannedCheck] {
        &self.checks
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn run(&self) -> Result<SuiteReport> {
        tracing::info!(checks = self.checks.len(), "suite run started");
        let started = Instant::now();
        let outcomes = self
            .checks
            .iter()
            .map(|planned| self.run_one(planned))
            .collect::<Vec<_>>();
        let report = SuiteReport::new(Utc::now(), outcomes, started.elapsed())?;
        let summary = &report.test_summary;
        tracing::info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            "suite run completed"
        );
        Ok(report)
    }

    fn run_one(&self, planned: &PlannedCheck) -> TestOutcome {
        let ctx = CheckContext {
            workspace: &self.workspace,
            params: &planned.params,
            registry: self.registry,
        };
        let started = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| planned.check.run(&ctx)));
        let elapsed = started.elapsed();
        let name = planned.test_name.as_str();

        let outcome = match result {
            Ok(Ok(CheckVerdict::Passed(diagnostics))) => {
                TestOutcome::passed(name, planned.category, elapsed).with_diagnostics(diagnostics)
            }
            Ok(Ok(CheckVerdict::Skipped(reason))) => {
                TestOutcome::skipped(name, planned.category, elapsed, reason)
            }
            Ok(Err(error)) => {
                let (message, diagnostics) = error.into_parts();
                TestOutcome::failed(name, planned.category, elapsed, message)
                    .with_diagnostics(diagnostics)
            }
            Err(payload) => TestOutcome::failed(
                name,
                planned.category,
                elapsed,
                format!("check panicked: {}", panic_message(payload.as_ref())),
            ),
        };
        tracing::debug!(
            test = name,
            status = %outcome.status,
            duration = outcome.duration,
            error = outcome.error.as_deref(),
            "check finished"
        );
        outcome
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

pub fn run_suite(
    spec: &SuiteSpec,
    registry: &CheckRegistry,
    workspace: impl Into<PathBuf>,
) -> Result<SuiteReport> {
    SuiteRunner::plan(spec, registry, workspace)?.run()
}
