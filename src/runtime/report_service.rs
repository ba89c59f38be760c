use std::fs;
use std::path::Path;

use crate::compare::{CompareOptions, Comparison, compare_reports, parse_report};
use crate::model::SuiteReport;
use crate::suite::save_report;

use super::{AppError, Result};

#[derive(Debug, Default, Clone, Copy)]
pub struct ReportService;

impl ReportService {
    pub fn save(&self, path: impl AsRef<Path>, report: &SuiteReport) -> Result<()> {
        let path = path.as_ref();
        save_report(path, report)?;
        tracing::info!(path = %path.display(), "report written");
        Ok(())
    }

    /// Read a report file for comparison.
    ///
    /// An unreadable file is [`AppError::Io`]; content that is not a valid
    /// report is [`AppError::Compare`] with an incompatible error.
    pub fn load(&self, path: impl AsRef<Path>, label: &str) -> Result<SuiteReport> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(parse_report(&raw, label)?)
    }

    pub fn compare<'a>(
        &self,
        current: &'a SuiteReport,
        baseline: &'a SuiteReport,
        options: &CompareOptions,
    ) -> Comparison<'a> {
        compare_reports(current, baseline, options)
    }
}
