use std::path::{Path, PathBuf};

use crate::checks::CheckRegistry;
use crate::config::QaConfig;

use super::{ReportService, Result, SuiteService};

#[derive(Debug, Clone)]
pub struct AppContext {
    workspace: PathBuf,
    config: QaConfig,
    suite_service: SuiteService,
    report_service: ReportService,
}

impl AppContext {
    /// Context with the built-in checks and the workspace's config file.
    pub fn load(workspace: impl Into<PathBuf>, config_path: Option<&Path>) -> Result<Self> {
        let workspace = workspace.into();
        let config = QaConfig::resolve(&workspace, config_path)?;
        Ok(Self::new(workspace, config))
    }

    pub fn new(workspace: impl Into<PathBuf>, config: QaConfig) -> Self {
        Self {
            workspace: workspace.into(),
            config,
            suite_service: SuiteService::default(),
            report_service: ReportService,
        }
    }

    pub fn with_registry(mut self, registry: CheckRegistry) -> Self {
        self.suite_service = SuiteService::new(registry);
        self
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    pub fn suite_service(&self) -> &SuiteService {
        &self.suite_service
    }

    pub fn report_service(&self) -> &ReportService {
        &self.report_service
    }
}
