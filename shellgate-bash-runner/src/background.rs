use std::fs::OpenOptions;
use std::path::Path;
use std::process::Stdio;

use tracing::{debug, info, warn};

use crate::executor::{CommandInvocation, ExecError, shell_command};

/// A command that was started detached from its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetachedProcess {
    /// OS pid of the shell; also the id of the process group it leads.
    pub pid: u32,
}

/// Start `invocation` detached, with stdout and stderr both appended to a
/// freshly truncated `log_path`.
///
/// The child leads its own process group. A tokio task reaps it once it
/// exits so a finished command does not linger as a zombie; this function
/// must therefore be called from within a tokio runtime.
pub fn spawn_detached(
    invocation: &CommandInvocation,
    log_path: &Path,
) -> Result<DetachedProcess, ExecError> {
    let log_error = |source| ExecError::LogFile {
        path: log_path.to_path_buf(),
        source,
    };
    let stdout_log = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)
        .map_err(log_error)?;
    let stderr_log = stdout_log.try_clone().map_err(log_error)?;

    let mut command = shell_command(invocation);
    command
        .stdout(Stdio::from(stdout_log))
        .stderr(Stdio::from(stderr_log));

    let mut child = command.spawn().map_err(|source| ExecError::Spawn {
        command: invocation.command.clone(),
        source,
    })?;
    let Some(pid) = child.id() else {
        // Only possible if the child was already polled to completion.
        return Err(ExecError::Io(std::io::Error::other(
            "detached child exited before its pid was read",
        )));
    };

    info!(pid, log = %log_path.display(), "spawned background command");

    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => debug!(pid, status = %status, "background command exited"),
            Err(err) => warn!(pid, error = %err, "failed to reap background command"),
        }
    });

    Ok(DetachedProcess { pid })
}
