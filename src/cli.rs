mod error;
mod render;
mod runner;
mod types;

#[cfg(test)]
mod tests;

pub use error::CliError;
pub use runner::run_cli;
