//! The shellgate engine: per-user workspaces and sessions, the command
//! safety gate, bounded foreground execution, and the supervised registry of
//! background processes.
//!
//! Callers hold one [`ShellEngine`] and drive everything through it with a
//! plain user identifier. Every operation returns plain data or a
//! [`ShellError`] whose `Display` is meant to be shown to the user as-is.

pub mod engine;
pub mod error;
pub mod foreground;
pub mod gate;
pub mod registry;
pub mod session;
pub mod transfer;
pub mod workspace;

pub use engine::ShellEngine;
pub use error::{ShellError, ShellResult};
pub use foreground::{ExecOutput, ForegroundExecutor};
pub use gate::{Denial, SafetyVerdict, SecurityGate};
pub use registry::{LogTail, ProcessEntry, ProcessRecord, ProcessRegistry, ProcessStatus, StopOutcome};
pub use session::SessionStore;
pub use transfer::TransferDirection;
pub use workspace::WorkspaceManager;
