use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Diagnostics, TestCategory};

use super::{CheckRegistry, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub kind: String,
}

impl ParamSpec {
    pub(crate) fn optional(name: &str, kind: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: false,
            kind: kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckSchema {
    pub name: String,
    pub description: String,
    pub category: TestCategory,
    pub params: Vec<ParamSpec>,
}

/// What a check reports when it does not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckVerdict {
    Passed(Diagnostics),
    Skipped(String),
}

impl CheckVerdict {
    pub fn passed() -> Self {
        CheckVerdict::Passed(Diagnostics::new())
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        CheckVerdict::Skipped(reason.into())
    }
}

/// Inputs handed to a check for one invocation.
pub struct CheckContext<'a> {
    pub workspace: &'a Path,
    pub params: &'a Value,
    pub registry: &'a CheckRegistry,
}

pub trait Check: Send + Sync {
    fn name(&self) -> &'static str;
    fn schema(&self) -> CheckSchema;
    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckVerdict>;

    fn category(&self) -> TestCategory {
        self.schema().category
    }
}
