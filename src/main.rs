use std::process::ExitCode;

fn main() -> ExitCode {
    ExitCode::from(integration_qa::run_cli())
}
