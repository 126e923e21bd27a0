use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Multi-tenant command shell with per-user workspaces.
#[derive(Debug, Clone, Parser)]
#[command(name = "shellgate", version)]
pub struct Cli {
    /// Configuration file (defaults to `SHELLGATE_CONFIG`, then `./shellgate.toml`).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands exposed by the `shellgate` entrypoint.
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run a command in the foreground and print its output.
    Exec(CommandArgs),

    /// Start a supervised background command.
    Spawn(CommandArgs),

    /// List background commands with their liveness.
    Ps(PsArgs),

    /// Stop a background command and everything it started.
    Stop(IdArgs),

    /// Print the tail of a background command's log.
    Logs(IdArgs),

    /// Resolve a file name for upload or download.
    Path(PathArgs),

    /// Interactive line-mode shell reading commands from stdin.
    Shell(UserArgs),
}

impl Commands {
    pub fn user(&self) -> &str {
        match self {
            Self::Exec(args) | Self::Spawn(args) => &args.user.user,
            Self::Ps(args) => &args.user.user,
            Self::Stop(args) | Self::Logs(args) => &args.user.user,
            Self::Path(args) => &args.user.user,
            Self::Shell(args) => &args.user,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct UserArgs {
    /// Identity whose workspace is used.
    #[arg(long, short = 'u')]
    pub user: String,
}

/// Arguments for `exec` and `spawn`.
#[derive(Debug, Clone, Args)]
pub struct CommandArgs {
    #[command(flatten)]
    pub user: UserArgs,

    /// Command line to run; words are joined with spaces.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl CommandArgs {
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}

/// Arguments for the `ps` subcommand.
#[derive(Debug, Clone, Args)]
pub struct PsArgs {
    #[command(flatten)]
    pub user: UserArgs,

    /// Output the records as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `stop` and `logs`.
#[derive(Debug, Clone, Args)]
pub struct IdArgs {
    #[command(flatten)]
    pub user: UserArgs,

    /// Background process id as shown by `ps`.
    pub id: usize,
}

/// Arguments for the `path` subcommand.
#[derive(Debug, Clone, Args)]
pub struct PathArgs {
    #[command(flatten)]
    pub user: UserArgs,

    /// Resolve as an upload target instead of a download source.
    #[arg(long)]
    pub upload: bool,

    /// File name, relative to the current directory or `~/`-rooted.
    pub name: String,
}
