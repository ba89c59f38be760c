mod error;
mod execute;
mod io;
mod spec;


pub use error::{Result, SuiteError};
pub use execute::{PlannedCheck, SuiteRunner, run_suite};
pub use io::{load_report, load_spec, save_report};
pub use spec::{CheckInvocation, SuiteSpec};
