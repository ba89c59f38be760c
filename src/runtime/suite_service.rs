use std::path::Path;

use crate::checks::{CheckRegistry, CheckSchema, default_registry};
use crate::model::SuiteReport;
use crate::suite::{SuiteRunner, SuiteSpec, load_spec};

use super::Result;

#[derive(Debug, Clone)]
pub struct SuiteService {
    registry: CheckRegistry,
}

impl Default for SuiteService {
    fn default() -> Self {
        Self::new(default_registry())
    }
}

impl SuiteService {
    pub fn new(registry: CheckRegistry) -> Self {
        Self { registry }
    }

    pub fn list(&self) -> Vec<CheckSchema> {
        self.registry.list()
    }

    pub fn load_spec(&self, path: impl AsRef<Path>) -> Result<SuiteSpec> {
        Ok(load_spec(path)?)
    }

    /// Resolve every check of `spec` without running anything.
    pub fn plan(&self, spec: &SuiteSpec, workspace: &Path) -> Result<SuiteRunner<'_>> {
        Ok(SuiteRunner::plan(spec, &self.registry, workspace)?)
    }

    pub fn run(&self, spec: &SuiteSpec, workspace: &Path) -> Result<SuiteReport> {
        Ok(self.plan(spec, workspace)?.run()?)
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }
}
