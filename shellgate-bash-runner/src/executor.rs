use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::process_group::{KillSignal, kill_process_group};

/// Upper bound on bytes captured per stream. Anything beyond is drained and
/// discarded so the child never blocks on a full pipe.
pub const MAX_CAPTURE_BYTES: usize = 1024 * 1024;

/// How long to wait for a killed child to be reaped after a timeout.
const REAP_TIMEOUT: Duration = Duration::from_secs(2);

/// Describes a command line that will be run through `sh -c`.
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub command: String,
    pub working_dir: PathBuf,
    pub env: Vec<(String, String)>,
}

impl CommandInvocation {
    pub fn new(command: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            working_dir: working_dir.into(),
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Describes the exit status of a command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    success: bool,
    code: Option<i32>,
}

impl CommandStatus {
    pub fn new(success: bool, code: Option<i32>) -> Self {
        Self { success, code }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// Exit code, or `None` when the command was ended by a signal.
    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl From<std::process::ExitStatus> for CommandStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Output produced by the executor for a command invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: CommandStatus,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("command timed out after {} seconds", timeout.as_secs())]
    TimedOut { timeout: Duration },
    #[error("failed to open log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Trait implemented by concrete command execution strategies.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(
        &self,
        invocation: &CommandInvocation,
        timeout: Duration,
    ) -> Result<CommandOutput, ExecError>;
}

/// Runs commands through the system shell in a dedicated process group.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCommandExecutor;

impl ProcessCommandExecutor {
    pub fn new() -> Self {
        Self
    }
}

/// Build the `sh -c` command for an invocation. The child leads its own
/// process group so a single `killpg` reaches everything it forks.
pub(crate) fn shell_command(invocation: &CommandInvocation) -> Command {
    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg(&invocation.command)
        .current_dir(&invocation.working_dir)
        .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null());
    #[cfg(unix)]
    command.process_group(0);
    command
}

#[async_trait]
impl CommandExecutor for ProcessCommandExecutor {
    async fn execute(
        &self,
        invocation: &CommandInvocation,
        timeout: Duration,
    ) -> Result<CommandOutput, ExecError> {
        let mut command = shell_command(invocation);
        command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            command: invocation.command.clone(),
            source,
        })?;
        let pid = child.id();
        debug!(pid = ?pid, command = %invocation.command, "spawned foreground command");

        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();

        let run = async {
            let (status, stdout, stderr) = tokio::join!(
                child.wait(),
                read_stream(stdout_handle),
                read_stream(stderr_handle)
            );
            Ok::<_, io::Error>((status?, stdout?, stderr?))
        };
        let outcome = tokio::time::timeout(timeout, run).await;

        match outcome {
            Ok(result) => {
                let (status, stdout, stderr) = result?;
                Ok(CommandOutput {
                    status: status.into(),
                    stdout: String::from_utf8_lossy(&stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&stderr).into_owned(),
                })
            }
            Err(_) => {
                warn!(pid = ?pid, timeout_secs = timeout.as_secs(), "command timed out; killing process group");
                if let Some(pid) = pid
                    && let Err(err) = kill_process_group(pid, KillSignal::Kill)
                {
                    warn!(pid, error = %err, "failed to kill timed-out process group");
                }
                let _ = child.start_kill();
                if tokio::time::timeout(REAP_TIMEOUT, child.wait()).await.is_err() {
                    warn!(pid = ?pid, "timed-out command was not reaped in time");
                }
                Err(ExecError::TimedOut { timeout })
            }
        }
    }
}

async fn read_stream<R>(reader: Option<R>) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(Vec::new());
    };

    let mut output = Vec::new();
    let mut buffer = [0u8; 4096];
    loop {
        let read = reader.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        let remaining = MAX_CAPTURE_BYTES.saturating_sub(output.len());
        if remaining > 0 {
            output.extend_from_slice(&buffer[..remaining.min(read)]);
        }
    }

    Ok(output)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn captures_both_streams_and_exit_code() {
        let dir = tempfile::tempdir().expect("tempdir");
        let invocation = CommandInvocation::new("echo out; echo err >&2; exit 3", dir.path());

        let output = ProcessCommandExecutor::new()
            .execute(&invocation, Duration::from_secs(10))
            .await
            .expect("command runs");

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.status.code(), Some(3));
        assert!(!output.status.success());
    }

    #[tokio::test]
    async fn runs_in_working_dir_with_env() {
        let dir = tempfile::tempdir().expect("tempdir");
        let canonical = dir.path().canonicalize().expect("canonical");
        let invocation = CommandInvocation::new("pwd -P; printf %s \"$SHELLGATE_MARKER\"", &canonical)
            .with_env("SHELLGATE_MARKER", "bound");

        let output = ProcessCommandExecutor::new()
            .execute(&invocation, Duration::from_secs(10))
            .await
            .expect("command runs");

        assert_eq!(output.stdout, format!("{}\nbound", canonical.display()));
    }

    #[tokio::test]
    async fn timeout_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let invocation = CommandInvocation::new("sleep 30", dir.path());

        let started = std::time::Instant::now();
        let error = ProcessCommandExecutor::new()
            .execute(&invocation, Duration::from_millis(200))
            .await
            .expect_err("must time out");

        assert!(matches!(error, ExecError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn missing_working_dir_fails_to_spawn() {
        let invocation = CommandInvocation::new("true", "/nonexistent/shellgate/dir");
        let error = ProcessCommandExecutor::new()
            .execute(&invocation, Duration::from_secs(5))
            .await
            .expect_err("spawn must fail");
        assert!(matches!(error, ExecError::Spawn { .. }));
    }
}
