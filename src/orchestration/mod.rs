//! Orchestration of the wrapped toolchain
//!
//! - `runner`: launching external processes
//! - `host`: host operating system detection
//! - `module`: a handle on an installed tool module
//! - `loader`: the single-slot resident module cache

pub mod host;
pub mod loader;
pub mod module;
pub mod runner;

pub use host::HostOs;
pub use loader::{ModuleFactory, ModuleLoader};
pub use module::{CordovaModule, CordovaModuleFactory, ToolModule};
pub use runner::{run_checked, CommandOutput, CommandRunner, CommandSpec, SystemRunner};

use crate::error::{TacoError, TacoResult};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Max number of output lines to include in command error messages.
const BUILD_ERROR_TAIL_LINES: usize = 50;

/// Extract the useful tail of command output for error diagnostics.
///
/// Combines stdout and stderr, then returns the last `BUILD_ERROR_TAIL_LINES`
/// lines so error messages are actionable without being overwhelming.
pub(crate) fn build_error_output(stdout: &str, stderr: &str) -> String {
    let lines: Vec<&str> = stdout.lines().chain(stderr.lines()).collect();
    let total = lines.len();
    let tail: Vec<&str> = if total > BUILD_ERROR_TAIL_LINES {
        lines[total - BUILD_ERROR_TAIL_LINES..].to_vec()
    } else {
        lines
    };
    tail.join("\n")
}

/// Which pipe a line of child output arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputStream {
    Stdout,
    Stderr,
}

/// Stream stdout+stderr from a child process, calling `on_output` for each line.
///
/// Returns the collected stdout and stderr text.
pub(crate) async fn stream_child_output(
    child: &mut tokio::process::Child,
    on_output: &(dyn Fn(OutputStream, &str) + Send + Sync),
) -> TacoResult<(String, String)> {
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| TacoError::Internal("child stderr not piped".to_string()))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| TacoError::Internal("child stdout not piped".to_string()))?;

    let mut stderr_reader = BufReader::new(stderr).lines();
    let mut stdout_reader = BufReader::new(stdout).lines();

    let mut out_lines = Vec::new();
    let mut err_lines = Vec::new();
    let mut stderr_done = false;
    let mut stdout_done = false;

    while !stderr_done || !stdout_done {
        tokio::select! {
            line = stderr_reader.next_line(), if !stderr_done => {
                match line {
                    Ok(Some(line)) => {
                        on_output(OutputStream::Stderr, &line);
                        err_lines.push(line);
                    }
                    _ => stderr_done = true,
                }
            }
            line = stdout_reader.next_line(), if !stdout_done => {
                match line {
                    Ok(Some(line)) => {
                        on_output(OutputStream::Stdout, &line);
                        out_lines.push(line);
                    }
                    _ => stdout_done = true,
                }
            }
        }
    }

    Ok((join_lines(out_lines), join_lines(err_lines)))
}

fn join_lines(lines: Vec<String>) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}
