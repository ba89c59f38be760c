mod context;
mod error;
mod report_service;
mod suite_service;


pub use context::AppContext;
pub use error::{AppError, Result};
pub use report_service::ReportService;
pub use suite_service::SuiteService;
