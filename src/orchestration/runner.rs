//! External process execution
//!
//! Every process the pipeline launches goes through a [`CommandRunner`], so the
//! working directory and environment are always explicit and tests can swap in
//! a scripted runner.

use crate::error::{TacoError, TacoResult};
use crate::orchestration::{build_error_output, stream_child_output, OutputStream};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// A process invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to run
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory (inherits ours when unset)
    pub cwd: Option<PathBuf>,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn envs(mut self, vars: &[(String, String)]) -> Self {
        self.env.extend(vars.iter().cloned());
        self
    }

    /// Shell-like rendering for logs and error messages
    pub fn display(&self) -> String {
        let mut out = self.program.clone();
        for arg in &self.args {
            out.push(' ');
            if arg.contains(' ') {
                out.push('"');
                out.push_str(arg);
                out.push('"');
            } else {
                out.push_str(arg);
            }
        }
        out
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// stdout followed by stderr, unmodified
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Abstract process launcher
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion and capture its output.
    ///
    /// Only fails when the process could not be started; a non-zero exit is
    /// reported through [`CommandOutput::code`].
    async fn run(&self, spec: &CommandSpec) -> TacoResult<CommandOutput>;
}

/// Run a command and turn a non-zero exit into [`TacoError::CommandExecution`]
pub async fn run_checked(runner: &dyn CommandRunner, spec: &CommandSpec) -> TacoResult<CommandOutput> {
    let output = runner.run(spec).await?;
    if output.success() {
        debug!("Exec complete: {}", spec.program);
        Ok(output)
    } else {
        Err(TacoError::command_exec(
            spec.display(),
            build_error_output(&output.stdout, &output.stderr),
        ))
    }
}

/// Runner backed by real child processes
///
/// Output is streamed to the log as it arrives (stdout at info, stderr at
/// warn) so long native builds show progress.
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> TacoResult<CommandOutput> {
        debug!("Exec: {}", spec.display());

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref dir) = spec.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| TacoError::command_failed(spec.display(), e))?;

        let log_line = |stream: OutputStream, line: &str| match stream {
            OutputStream::Stdout => info!("{}", line),
            OutputStream::Stderr => warn!("{}", line),
        };
        let (stdout, stderr) = stream_child_output(&mut child, &log_line).await?;

        let status = child
            .wait()
            .await
            .map_err(|e| TacoError::command_failed(spec.display(), e))?;

        Ok(CommandOutput {
            code: status.code(),
            stdout,
            stderr,
        })
    }
}
