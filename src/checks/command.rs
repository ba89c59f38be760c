use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde_json::{Value, json};

use crate::model::{Diagnostics, TestCategory};

use super::{
    Check, CheckContext, CheckError, CheckSchema, CheckVerdict, ParamSpec, Result,
    get_optional_f64, get_optional_str, get_optional_u64, get_string_list, reject_unknown_params,
};

const KNOWN_PARAMS: [&str; 6] = [
    "command",
    "args",
    "cwd",
    "env",
    "timeout_secs",
    "skip_exit_code",
];
const DEFAULT_SKIP_EXIT_CODE: u64 = 77;
const TAIL_LINES: usize = 20;
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs an external program; exit status 0 passes, the skip code skips,
/// anything else fails.
#[derive(Debug, Clone, Copy)]
pub struct CommandCheck;

impl Check for CommandCheck {
    fn name(&self) -> &'static str {
        "command"
    }

    fn schema(&self) -> CheckSchema {
        CheckSchema {
            name: self.name().to_string(),
            description: "Run an external program and map its exit status to an outcome."
                .to_string(),
            category: TestCategory::Integration,
            params: vec![
                ParamSpec::optional(
                    "command",
                    "string",
                    "Command line, split with shell quoting rules. Mutually exclusive with `args`.",
                ),
                ParamSpec::optional("args", "string[]", "Program followed by its arguments."),
                ParamSpec::optional("cwd", "string", "Working directory relative to the workspace."),
                ParamSpec::optional("env", "object", "Extra environment variables."),
                ParamSpec::optional(
                    "timeout_secs",
                    "float",
                    "Kill the program and fail after this many seconds.",
                ),
                ParamSpec::optional(
                    "skip_exit_code",
                    "integer",
                    "Exit status reported as skipped (default 77).",
                ),
            ],
        }
    }

    fn run(&self, ctx: &CheckContext<'_>) -> Result<CheckVerdict> {
        let params = ctx.params;
        reject_unknown_params(params, &KNOWN_PARAMS)?;

        let argv = command_line(params)?;
        let Some((program, args)) = argv.split_first() else {
            return Err(CheckError::InvalidParams("command is empty".to_string()));
        };
        let cwd = match get_optional_str(params, "cwd")? {
            Some(dir) => ctx.workspace.join(dir),
            None => ctx.workspace.to_path_buf(),
        };
        let timeout_secs = get_optional_f64(params, "timeout_secs")?;
        if let Some(secs) = timeout_secs.filter(|secs| !secs.is_finite() || *secs <= 0.0) {
            return Err(CheckError::InvalidParams(format!(
                "timeout_secs must be positive, got {secs}"
            )));
        }
        let timeout = timeout_secs
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|error| {
                    CheckError::InvalidParams(format!("timeout_secs {secs} is out of range: {error}"))
                })
            })
            .transpose()?;
        let skip_exit_code = get_optional_u64(params, "skip_exit_code", DEFAULT_SKIP_EXIT_CODE)?;

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(env) = params.get("env").filter(|value| !value.is_null()) {
            let map = env.as_object().ok_or_else(|| {
                CheckError::InvalidParams("parameter `env` must be an object".to_string())
            })?;
            for (key, value) in map {
                let value = value.as_str().ok_or_else(|| {
                    CheckError::InvalidParams(format!("env value for `{key}` must be a string"))
                })?;
                command.env(key, value);
            }
        }

        tracing::debug!(program = %program, cwd = %cwd.display(), "spawning command check");
        let mut child = command
            .spawn()
            .map_err(|error| CheckError::Failed(format!("failed to spawn `{program}`: {error}")))?;
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let Some(status) = wait_with_timeout(&mut child, timeout)? else {
            // Readers are left detached: grandchildren may still hold the pipes open.
            let secs = timeout_secs.unwrap_or_default();
            let mut diagnostics = Diagnostics::new();
            diagnostics.insert("analysis".to_string(), json!({ "timed_out": true }));
            return Err(CheckError::FailedWithDiagnostics {
                message: format!("timed out after {secs}s"),
                diagnostics,
            });
        };

        let stdout = collect(stdout);
        let stderr = collect(stderr);
        let mut diagnostics = Diagnostics::new();
        diagnostics.insert(
            "analysis".to_string(),
            json!({
                "exit_code": status.code(),
                "stdout_tail": tail(&stdout, TAIL_LINES),
                "stderr_tail": tail(&stderr, TAIL_LINES),
            }),
        );

        if status.success() {
            return Ok(CheckVerdict::Passed(diagnostics));
        }
        if status.code().map(i64::from) == Some(skip_exit_code as i64) {
            let reason = last_line(&stdout)
                .or_else(|| last_line(&stderr))
                .map(str::to_string)
                .unwrap_or_else(|| format!("command requested skip (exit code {skip_exit_code})"));
            return Ok(CheckVerdict::Skipped(reason));
        }

        let mut message = format!("`{program}` exited with {status}");
        if let Some(line) = last_line(&stderr) {
            message.push_str(": ");
            message.push_str(line);
        }
        Err(CheckError::FailedWithDiagnostics {
            message,
            diagnostics,
        })
    }
}

fn command_line(params: &Value) -> Result<Vec<String>> {
    let command = get_optional_str(params, "command")?;
    let args = get_string_list(params, "args")?;
    match (command, args) {
        (Some(_), Some(_)) => Err(CheckError::InvalidParams(
            "`command` and `args` are mutually exclusive".to_string(),
        )),
        (Some(line), None) => shell_words::split(line).map_err(|error| {
            CheckError::InvalidParams(format!("cannot parse `command`: {error}"))
        }),
        (None, Some(args)) => Ok(args),
        (None, None) => Err(CheckError::InvalidParams(
            "either `command` or `args` is required".to_string(),
        )),
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return Ok(Some(child.wait()?));
    };
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if started.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            buffer
        })
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn tail(text: &str, count: usize) -> String {
    let lines = text.lines().collect::<Vec<_>>();
    lines[lines.len().saturating_sub(count)..].join("\n")
}

fn last_line(text: &str) -> Option<&str> {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
}
