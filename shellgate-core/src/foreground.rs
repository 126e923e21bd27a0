use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use shellgate_bash_runner::{CommandExecutor, CommandInvocation, ExecError};
use shellgate_commons::truncate_head;
use shellgate_config::ExecutionConfig;
use tracing::{debug, info, warn};

use crate::error::{ShellError, ShellResult};
use crate::gate::{SecurityGate, tokenize};
use crate::session::{SessionStore, workspace_display};

/// Captured result of a foreground command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` for the `cd` pseudo-command and for signal-terminated runs.
    pub exit_code: Option<i32>,
}

impl ExecOutput {
    fn message(text: String) -> Self {
        Self {
            stdout: text,
            ..Self::default()
        }
    }
}

/// Build an invocation with `HOME`, `USER` and `PWD` pinned to the user's
/// workspace. The rest of the environment is inherited.
pub(crate) fn bound_invocation(command: &str, user: &str, root: &Path, cwd: &Path) -> CommandInvocation {
    CommandInvocation::new(command, cwd)
        .with_env("HOME", root.display().to_string())
        .with_env("USER", user)
        .with_env("PWD", cwd.display().to_string())
}

/// Runs gated commands synchronously with a wall-clock limit.
pub struct ForegroundExecutor {
    gate: Arc<SecurityGate>,
    sessions: Arc<SessionStore>,
    executor: Arc<dyn CommandExecutor>,
    timeout: Duration,
    max_output_chars: usize,
}

impl ForegroundExecutor {
    pub fn new(
        gate: Arc<SecurityGate>,
        sessions: Arc<SessionStore>,
        executor: Arc<dyn CommandExecutor>,
        config: &ExecutionConfig,
    ) -> Self {
        Self {
            gate,
            sessions,
            executor,
            timeout: config.foreground_timeout(),
            max_output_chars: config.max_output_chars,
        }
    }

    /// Run `command` for `user` whose workspace is `root`.
    ///
    /// `cd` is handled here against the session store and never reaches the
    /// gate or a shell.
    pub async fn run(&self, user: &str, root: &Path, command: &str) -> ShellResult<ExecOutput> {
        let command = command.trim();
        if command.is_empty() {
            return Err(ShellError::EmptyCommand);
        }

        if let Some(arg) = cd_argument(command) {
            let dir = self.sessions.change_directory(user, root, arg)?;
            debug!(user, dir = %dir.display(), "session directory changed");
            return Ok(ExecOutput::message(format!("{}\n", workspace_display(root, &dir))));
        }

        let cwd = self.sessions.current_dir(user, root);
        if let Err(err) = self.gate.check(command, root, &cwd).into_result() {
            info!(user, kind = err.kind(), command, "command denied");
            return Err(err);
        }

        if requests_background(command) {
            return Err(ShellError::BackgroundRequested);
        }

        let invocation = bound_invocation(command, user, root, &cwd);
        let output = match self.executor.execute(&invocation, self.timeout).await {
            Ok(output) => output,
            Err(ExecError::TimedOut { timeout }) => {
                warn!(user, command, timeout_secs = timeout.as_secs(), "foreground command timed out");
                return Err(ShellError::Timeout {
                    seconds: timeout.as_secs(),
                });
            }
            Err(err) => return Err(exec_failure(err)),
        };

        debug!(user, command, code = ?output.status.code(), "foreground command finished");
        Ok(ExecOutput {
            stdout: truncate_head(&output.stdout, self.max_output_chars).into_owned(),
            stderr: truncate_head(&output.stderr, self.max_output_chars).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

pub(crate) fn exec_failure(err: ExecError) -> ShellError {
    match err {
        ExecError::Io(source) => ShellError::Io(source),
        other => ShellError::SpawnFailure(other.to_string()),
    }
}

/// `Some(arg)` when `command` is the `cd` pseudo-command; `arg` is `None`
/// for a bare `cd`.
fn cd_argument(command: &str) -> Option<Option<&str>> {
    let rest = command.strip_prefix("cd")?;
    if rest.is_empty() {
        return Some(None);
    }
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim();
    let rest = rest
        .strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .or_else(|| rest.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')))
        .unwrap_or(rest);
    Some((!rest.is_empty()).then_some(rest))
}

/// A trailing `&` (not `&&`) or a leading `nohup`.
fn requests_background(command: &str) -> bool {
    let trimmed = command.trim_end();
    if trimmed.ends_with('&') && !trimmed.ends_with("&&") {
        return true;
    }
    tokenize(command).first().is_some_and(|program| program == "nohup")
}
