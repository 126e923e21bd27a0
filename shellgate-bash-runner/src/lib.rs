//! Process plumbing behind the shellgate engine. The crate knows how to run
//! a shell command line inside its own process group, bound the run with a
//! wall-clock timeout, redirect a detached command into a log file, and
//! signal or check a process group later. It makes no policy decisions:
//! callers validate commands before handing them over.

pub mod background;
pub mod executor;
pub mod process_group;

pub use background::{DetachedProcess, spawn_detached};
pub use executor::{
    CommandExecutor, CommandInvocation, CommandOutput, CommandStatus, ExecError,
    ProcessCommandExecutor,
};
pub use process_group::{KillSignal, TerminationOutcome};
