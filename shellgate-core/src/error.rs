use std::io;

use thiserror::Error;

pub type ShellResult<T> = Result<T, ShellError>;

/// Every way an engine operation can fail. The `Display` text is the
/// explanation shown to the user; none of these are fatal to the engine.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("access denied for user `{user}`")]
    AuthorizationDenied { user: String },

    #[error("invalid user id `{user}`")]
    InvalidUser { user: String },

    #[error("access denied: `{path}` is outside your workspace")]
    ContainmentViolation { path: String },

    #[error("command not allowed: `{program}`")]
    CommandNotAllowed { program: String },

    #[error("blocked: command matches dangerous pattern `{pattern}`")]
    DangerousPatternBlocked { pattern: String },

    #[error("no command")]
    EmptyCommand,

    #[error("background commands (`&` or `nohup`) must be started with the background runner")]
    BackgroundRequested,

    #[error("failed to start process: {0}")]
    SpawnFailure(String),

    #[error("command timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("no background process with id {id}")]
    ProcessNotFound { id: usize },

    #[error("failed to stop process {id}: {reason}")]
    StopFailure { id: usize, reason: String },

    #[error("log unavailable: {0}")]
    LogUnavailable(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("directory not found: `{path}`")]
    DirectoryNotFound { path: String },

    #[error("file not found: `{path}`")]
    FileNotFound { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Stable, machine-friendly name of the variant for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthorizationDenied { .. } => "authorization_denied",
            Self::InvalidUser { .. } => "invalid_user",
            Self::ContainmentViolation { .. } => "containment_violation",
            Self::CommandNotAllowed { .. } => "command_not_allowed",
            Self::DangerousPatternBlocked { .. } => "dangerous_pattern_blocked",
            Self::EmptyCommand => "empty_command",
            Self::BackgroundRequested => "background_requested",
            Self::SpawnFailure(_) => "spawn_failure",
            Self::Timeout { .. } => "timeout",
            Self::ProcessNotFound { .. } => "process_not_found",
            Self::StopFailure { .. } => "stop_failure",
            Self::LogUnavailable(_) => "log_unavailable",
            Self::InvalidPath(_) => "invalid_path",
            Self::DirectoryNotFound { .. } => "directory_not_found",
            Self::FileNotFound { .. } => "file_not_found",
            Self::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_user_facing() {
        let error = ShellError::CommandNotAllowed {
            program: "forbidden-binary".to_string(),
        };
        assert_eq!(error.to_string(), "command not allowed: `forbidden-binary`");
        assert_eq!(error.kind(), "command_not_allowed");
        assert_eq!(ShellError::Timeout { seconds: 60 }.to_string(), "command timed out after 60 seconds");
    }
}
