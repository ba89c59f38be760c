pub mod checks;
pub mod cli;
pub mod compare;
pub mod config;
pub mod gate;
pub mod logging;
pub mod model;
pub mod runtime;
pub mod suite;

pub fn run_cli() -> u8 {
    cli::run_cli()
}
