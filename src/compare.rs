mod diff;
mod error;
mod options;


pub use diff::{
    ChangeKind, Comparison, ComparisonRecord, MetricRegression, StatusChange, compare_json,
    compare_reports, parse_report,
};
pub use error::{CompareError, Result};
pub use options::{CompareOptions, DEFAULT_METRIC_TEST, Direction, MetricRule};
