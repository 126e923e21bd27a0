//! Command safety gate.
//!
//! The gate is syntactic: it checks the raw command line against a pattern
//! blocklist, the first token against an allowlist, and every argument that
//! contains `..` against the workspace boundary. It does not understand
//! shell grammar, so `;`, `&&`, `|` and redirections are not split into
//! separate commands.

mod allowlist;
mod patterns;

use std::fmt;
use std::path::Path;

use hashbrown::HashSet;
use shellgate_commons::secure_path;
use shellgate_config::SecurityConfig;

use crate::error::ShellError;

pub use allowlist::ALLOWED_COMMANDS;
pub use patterns::{DANGEROUS_PATTERNS, find_dangerous_pattern};

/// Why the gate refused a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    DangerousPattern { pattern: &'static str },
    NoCommand,
    NotAllowed { program: String },
    PathTraversal { argument: String },
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DangerousPattern { pattern } => {
                write!(f, "blocked dangerous pattern `{pattern}`")
            }
            Self::NoCommand => f.write_str("no command"),
            Self::NotAllowed { program } => write!(f, "command not allowed: `{program}`"),
            Self::PathTraversal { argument } => write!(f, "path traversal: `{argument}`"),
        }
    }
}

/// Outcome of [`SecurityGate::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyVerdict {
    Allowed,
    Denied(Denial),
}

impl SafetyVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    pub fn reason(&self) -> String {
        match self {
            Self::Allowed => "allowed".to_string(),
            Self::Denied(denial) => denial.to_string(),
        }
    }

    pub fn into_result(self) -> Result<(), ShellError> {
        match self {
            Self::Allowed => Ok(()),
            Self::Denied(Denial::DangerousPattern { pattern }) => {
                Err(ShellError::DangerousPatternBlocked {
                    pattern: pattern.to_string(),
                })
            }
            Self::Denied(Denial::NoCommand) => Err(ShellError::EmptyCommand),
            Self::Denied(Denial::NotAllowed { program }) => {
                Err(ShellError::CommandNotAllowed { program })
            }
            Self::Denied(Denial::PathTraversal { argument }) => {
                Err(ShellError::ContainmentViolation { path: argument })
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecurityGate {
    allowed: HashSet<String>,
    script_extensions: Vec<String>,
}

impl Default for SecurityGate {
    fn default() -> Self {
        Self::new(&SecurityConfig::default())
    }
}

impl SecurityGate {
    pub fn new(config: &SecurityConfig) -> Self {
        let allowed = ALLOWED_COMMANDS
            .iter()
            .map(|name| (*name).to_string())
            .chain(config.extra_allowed_commands.iter().map(|name| name.trim().to_string()))
            .collect();
        Self {
            allowed,
            script_extensions: config.script_extensions.clone(),
        }
    }

    /// Validate `command` for a user whose workspace is `root` and whose
    /// cursor is `current_dir`.
    pub fn check(&self, command: &str, root: &Path, current_dir: &Path) -> SafetyVerdict {
        if let Some(pattern) = find_dangerous_pattern(command) {
            return SafetyVerdict::Denied(Denial::DangerousPattern { pattern });
        }

        let tokens = tokenize(command);
        let Some((program, args)) = tokens.split_first() else {
            return SafetyVerdict::Denied(Denial::NoCommand);
        };

        if !self.is_program_allowed(program) {
            return SafetyVerdict::Denied(Denial::NotAllowed {
                program: program.clone(),
            });
        }

        for arg in args {
            if arg.starts_with('-') || !arg.contains("..") {
                continue;
            }
            if secure_path(root, current_dir, Path::new(arg)).is_err() {
                return SafetyVerdict::Denied(Denial::PathTraversal {
                    argument: arg.clone(),
                });
            }
        }

        SafetyVerdict::Allowed
    }

    fn is_program_allowed(&self, program: &str) -> bool {
        self.allowed.contains(program)
            || self
                .script_extensions
                .iter()
                .any(|extension| program.ends_with(extension.as_str()))
    }
}

/// Split with shell quoting rules, falling back to whitespace on
/// unbalanced quotes.
pub(crate) fn tokenize(command: &str) -> Vec<String> {
    shell_words::split(command)
        .unwrap_or_else(|_| command.split_whitespace().map(str::to_string).collect())
}
