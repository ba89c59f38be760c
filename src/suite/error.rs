use crate::model::ModelError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SuiteError>;

#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("suite specification parse failure: {0}")]
    Parse(String),

    #[error("unknown check `{check}` for test `{test}` (tried: {tried})")]
    UnknownCheck {
        test: String,
        check: String,
        tried: String,
    },

    #[error("suite I/O failure on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("suite serialization failure: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("suite YAML serialization failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("invalid report: {0}")]
    Model(#[from] ModelError),
}

impl SuiteError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        SuiteError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// True for failures reading or writing files, as opposed to bad content.
    pub fn is_io(&self) -> bool {
        matches!(self, SuiteError::Io { .. })
    }
}
