use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::gate::GateConfig;

#[derive(Debug, Parser)]
#[command(
    name = "integration-qa",
    version,
    about = "Run integration QA suites, compare against a baseline and gate CI on the result"
)]
pub(super) struct Cli {
    /// Workspace root that checks run in and config is read from.
    #[arg(long, global = true, default_value = ".")]
    pub(super) workspace: PathBuf,
    #[arg(long, global = true, env = "INTEGRATION_QA_CONFIG")]
    pub(super) config: Option<PathBuf>,
    /// Raise log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub(super) verbose: u8,
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub(super) log_json: bool,
    #[command(subcommand)]
    pub(super) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(super) enum Commands {
    /// Run the suite and evaluate gates.
    Run(RunArgs),
    /// Compare two saved reports and evaluate gates.
    Compare(CompareArgs),
    /// List registered checks and their parameters.
    Checks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(super) enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Args)]
pub(super) struct RunArgs {
    /// Suite spec (JSON or YAML). Defaults to the configured suite or the built-in one.
    #[arg(long)]
    pub(super) suite: Option<PathBuf>,
    /// Include per-test results in the printed output.
    #[arg(long)]
    pub(super) detailed: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(super) format: OutputFormat,
    /// Write the full JSON report to this path.
    #[arg(long)]
    pub(super) output: Option<PathBuf>,
    /// Previously saved report to compare against.
    #[arg(long)]
    pub(super) baseline: Option<PathBuf>,
    #[command(flatten)]
    pub(super) gates: GateArgs,
    /// Allowed success-rate drop (fraction) before it counts as a regression.
    #[arg(long)]
    pub(super) rate_tolerance: Option<f64>,
}

#[derive(Debug, Args)]
pub(super) struct CompareArgs {
    pub(super) current: PathBuf,
    pub(super) baseline: PathBuf,
    #[arg(long)]
    pub(super) detailed: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(super) format: OutputFormat,
    #[command(flatten)]
    pub(super) gates: GateArgs,
    #[arg(long)]
    pub(super) rate_tolerance: Option<f64>,
}

#[derive(Debug, Clone, Default, Args)]
pub(super) struct GateArgs {
    /// Exit 1 when any test failed.
    #[arg(long)]
    pub(super) fail_on_error: bool,
    /// Exit 2 when the success rate is below this percentage.
    #[arg(long, value_name = "PCT", value_parser = parse_percentage)]
    pub(super) min_success_rate: Option<f64>,
    /// Exit 3 when the baseline has a different set of tests.
    #[arg(long)]
    pub(super) fail_on_mismatch: bool,
    /// Exit 4 when a regression against the baseline is detected.
    #[arg(long)]
    pub(super) fail_on_regression: bool,
    /// Same as --fail-on-error --fail-on-mismatch --fail-on-regression.
    #[arg(long)]
    pub(super) strict: bool,
}

impl GateArgs {
    pub(super) fn to_config(&self) -> GateConfig {
        GateConfig {
            fail_on_error: self.fail_on_error,
            min_success_rate: self.min_success_rate,
            fail_on_mismatch: self.fail_on_mismatch,
            fail_on_regression: self.fail_on_regression,
            strict: self.strict,
        }
    }
}

pub(super) fn parse_percentage(raw: &str) -> Result<f64, String> {
    let value = raw
        .trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .map_err(|err| format!("`{raw}` is not a number: {err}"))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("`{raw}` must be within 0..=100"));
    }
    Ok(value)
}

