//! Workspace configuration (`integration-qa.yaml`).

mod error;


use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::compare::CompareOptions;
use crate::gate::GateConfig;

pub use error::{ConfigError, Result};

/// File names looked up in the workspace, in order, when no path is given.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = [
    "integration-qa.yaml",
    "integration-qa.yml",
    "integration-qa.json",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QaConfig {
    /// Suite spec path, relative to the workspace.
    pub suite: Option<PathBuf>,
    pub compare: CompareOptions,
    pub gates: GateConfig,
    /// Default report path, relative to the workspace.
    pub output: Option<PathBuf>,
}

impl QaConfig {
    /// Load an explicit config file. A missing file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let parse_error = |message: String| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        };
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = if extension == "json" {
            serde_json::from_str::<QaConfig>(&raw).map_err(|err| parse_error(err.to_string()))?
        } else {
            serde_yaml::from_str::<QaConfig>(&raw).map_err(|err| parse_error(err.to_string()))?
        };
        config.validate().map_err(|message| ConfigError::Invalid {
            path: path.display().to_string(),
            message,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Use `explicit` when given, otherwise the first default file present in
    /// `workspace`, otherwise built-in defaults.
    pub fn resolve(workspace: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| workspace.join(name))
            .find(|candidate| candidate.is_file())
        {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        self.compare.validate().map_err(|err| err.to_string())?;
        if let Some(rate) = self.gates.min_success_rate {
            if !(0.0..=100.0).contains(&rate) {
                return Err(format!(
                    "gates.min_success_rate must be within 0..=100, got {rate}"
                ));
            }
        }
        Ok(())
    }

    pub fn suite_path(&self, workspace: &Path) -> Option<PathBuf> {
        self.suite.as_ref().map(|path| workspace.join(path))
    }

    pub fn output_path(&self, workspace: &Path) -> Option<PathBuf> {
        self.output.as_ref().map(|path| workspace.join(path))
    }
}
