use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::model::TestCategory;

use super::{Result, SuiteError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuiteSpec {
    pub name: Option<String>,
    #[serde(default)]
    pub checks: Vec<CheckInvocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckInvocation {
    /// Test name in the report; defaults to the check name.
    #[serde(default)]
    pub name: Option<String>,
    pub check: String,
    #[serde(default)]
    pub category: Option<TestCategory>,
    #[serde(default)]
    pub params: Value,
    /// Alternative check names tried when `check` is not registered.
    #[serde(default)]
    pub fallback: Vec<String>,
}

impl CheckInvocation {
    pub fn new(check: impl Into<String>) -> Self {
        Self {
            name: None,
            check: check.into(),
            category: None,
            params: Value::Null,
            fallback: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    pub fn test_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.check)
    }
}

impl SuiteSpec {
    /// Suite used when no suite file is configured.
    pub fn default_suite() -> Self {
        Self {
            name: Some("integration".to_string()),
            checks: vec![
                CheckInvocation::new("integration.wiring"),
                CheckInvocation::new("performance.benchmark")
                    .with_params(json!({"iterations": 200, "warmup": 10})),
                CheckInvocation::new("analysis.history"),
            ],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.checks.is_empty() {
            return Err(SuiteError::Parse(
                "suite must include at least one check".to_string(),
            ));
        }
        let mut names = HashSet::with_capacity(self.checks.len());
        for (index, invocation) in self.checks.iter().enumerate() {
            if invocation.check.trim().is_empty() {
                return Err(SuiteError::Parse(format!(
                    "check at index {index} has an empty name"
                )));
            }
            if invocation.test_name().trim().is_empty() {
                return Err(SuiteError::Parse(format!(
                    "test at index {index} has an empty name"
                )));
            }
            if !names.insert(invocation.test_name()) {
                return Err(SuiteError::Parse(format!(
                    "duplicate test name `{}`",
                    invocation.test_name()
                )));
            }
            if !invocation.params.is_object() && !invocation.params.is_null() {
                return Err(SuiteError::Parse(format!(
                    "check `{}` parameters must be a JSON object",
                    invocation.test_name()
                )));
            }
        }
        Ok(())
    }
}
