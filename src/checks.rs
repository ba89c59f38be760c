mod benchmark;
mod command;
mod error;
mod history;
mod params;
mod registry;
mod schema;
mod wiring;


pub use benchmark::PerformanceBenchmarkCheck;
pub use command::CommandCheck;
pub use error::{CheckError, Result};
pub use history::HistoryAnalysisCheck;
pub use registry::{CheckRegistry, Resolution, default_registry};
pub use schema::{Check, CheckContext, CheckSchema, CheckVerdict, ParamSpec};
pub use wiring::WiringCheck;

pub(crate) use params::{
    get_optional_f64, get_optional_str, get_optional_u64, get_string_list, reject_unknown_params,
};
