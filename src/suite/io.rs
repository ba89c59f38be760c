use std::fs;
use std::path::Path;

use crate::model::SuiteReport;

use super::{Result, SuiteError, SuiteSpec};

fn is_yaml(path: &Path) -> bool {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    matches!(extension.as_str(), "yaml" | "yml")
}

pub fn load_spec(path: impl AsRef<Path>) -> Result<SuiteSpec> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| SuiteError::io(path, source))?;
    let spec = if is_yaml(path) {
        serde_yaml::from_str::<SuiteSpec>(&raw)?
    } else {
        serde_json::from_str::<SuiteSpec>(&raw)?
    };
    spec.validate()?;
    Ok(spec)
}

/// Reports are always persisted as pretty JSON with their full result list.
pub fn save_report(path: impl AsRef<Path>, report: &SuiteReport) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| SuiteError::io(parent, source))?;
    }
    let mut serialized = serde_json::to_string_pretty(report)?;
    serialized.push('\n');
    fs::write(path, serialized).map_err(|source| SuiteError::io(path, source))?;
    Ok(())
}

pub fn load_report(path: impl AsRef<Path>) -> Result<SuiteReport> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| SuiteError::io(path, source))?;
    let report = serde_json::from_str::<SuiteReport>(&raw)?;
    report.validate()?;
    Ok(report)
}
