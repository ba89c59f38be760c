use std::io::Write;
use std::path::Path;

use clap::Parser;

use crate::compare::{CompareError, CompareOptions};
use crate::gate::{BaselineState, EXIT_OK, EXIT_USAGE, GateConfig, evaluate};
use crate::logging::init_tracing;
use crate::model::SuiteReport;
use crate::runtime::{AppContext, AppError};
use crate::suite::SuiteSpec;

use super::CliError;
use super::render::{render_json, render_text};
use super::types::{Cli, Commands, CompareArgs, OutputFormat, RunArgs};

/// A baseline that was read but may not parse as a report.
type Baseline = std::result::Result<SuiteReport, CompareError>;

/// Parse arguments, run the requested command and return the process exit code.
pub fn run_cli() -> u8 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return if error.use_stderr() { EXIT_USAGE } else { EXIT_OK };
        }
    };
    init_tracing(cli.verbose, cli.log_json);

    match execute(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            error.exit_code()
        }
    }
}

fn execute(cli: Cli) -> Result<u8, CliError> {
    let app = AppContext::load(&cli.workspace, cli.config.as_deref())?;
    match cli.command {
        Commands::Run(args) => run_suite(&app, args),
        Commands::Compare(args) => compare_reports(&app, args),
        Commands::Checks => {
            let schemas = app.suite_service().list();
            emit(&serde_json::to_string_pretty(&schemas)?)?;
            Ok(EXIT_OK)
        }
    }
}

fn run_suite(app: &AppContext, args: RunArgs) -> Result<u8, CliError> {
    let has_baseline = args.baseline.is_some();
    let flags = args.gates.to_config();
    flags.validate(has_baseline).map_err(AppError::from)?;
    let gates = effective_gates(app, &flags, has_baseline);
    let options = compare_options(app, args.rate_tolerance)?;

    let spec = match args.suite.or_else(|| app.config().suite_path(app.workspace())) {
        Some(path) => app.suite_service().load_spec(path)?,
        None => SuiteSpec::default_suite(),
    };
    let runner = app.suite_service().plan(&spec, app.workspace())?;

    let baseline = match &args.baseline {
        Some(path) => Some(load_baseline(app, path)?),
        None => None,
    };

    let report = runner.run().map_err(AppError::from)?;
    if let Some(path) = args
        .output
        .clone()
        .or_else(|| app.config().output_path(app.workspace()))
    {
        app.report_service().save(path, &report)?;
    }

    finish(
        app,
        &report,
        baseline.as_ref(),
        &options,
        &gates,
        args.format,
        args.detailed,
    )
}

fn compare_reports(app: &AppContext, args: CompareArgs) -> Result<u8, CliError> {
    let flags = args.gates.to_config();
    flags.validate(true).map_err(AppError::from)?;
    let gates = effective_gates(app, &flags, true);
    let options = compare_options(app, args.rate_tolerance)?;

    let current = app.report_service().load(&args.current, "current")?;
    let baseline = load_baseline(app, &args.baseline)?;
    finish(
        app,
        &current,
        Some(&baseline),
        &options,
        &gates,
        args.format,
        args.detailed,
    )
}

/// Config gates layered under the CLI flags. Baseline-only toggles from the
/// config are dropped when no baseline is in play.
fn effective_gates(app: &AppContext, flags: &GateConfig, has_baseline: bool) -> GateConfig {
    let mut configured = app.config().gates.clone();
    if !has_baseline {
        configured.fail_on_mismatch = false;
        configured.fail_on_regression = false;
    }
    configured.merged_with(flags)
}

fn compare_options(
    app: &AppContext,
    rate_tolerance: Option<f64>,
) -> Result<CompareOptions, CliError> {
    let mut options = app.config().compare.clone();
    if let Some(tolerance) = rate_tolerance {
        options.rate_tolerance = tolerance;
    }
    options
        .validate()
        .map_err(|error| CliError::Usage(error.to_string()))?;
    Ok(options)
}

/// Unreadable baselines are fatal; unparsable ones are carried as incompatible.
fn load_baseline(app: &AppContext, path: &Path) -> Result<Baseline, CliError> {
    match app.report_service().load(path, "baseline") {
        Ok(report) => Ok(Ok(report)),
        Err(AppError::Compare(error)) => {
            tracing::warn!(path = %path.display(), %error, "baseline is not a usable report");
            Ok(Err(error))
        }
        Err(error) => Err(error.into()),
    }
}

fn finish(
    app: &AppContext,
    report: &SuiteReport,
    baseline: Option<&Baseline>,
    options: &CompareOptions,
    gates: &GateConfig,
    format: OutputFormat,
    detailed: bool,
) -> Result<u8, CliError> {
    let comparison = match baseline {
        Some(Ok(baseline)) => Some(app.report_service().compare(report, baseline, options)),
        _ => None,
    };
    let state = match (baseline, &comparison) {
        (Some(_), Some(comparison)) => BaselineState::Compared(comparison),
        (Some(Err(error)), None) => BaselineState::Incompatible(error),
        _ => BaselineState::NotRequested,
    };
    let verdict = evaluate(report, state, gates);
    tracing::info!(exit_code = verdict.exit_code(), %verdict, "gates evaluated");

    let rendered = match format {
        OutputFormat::Text => render_text(report, detailed, state, &verdict),
        OutputFormat::Json => render_json(report, detailed, state, &verdict)?,
    };
    emit(&rendered)?;
    Ok(verdict.exit_code())
}

fn emit(rendered: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
