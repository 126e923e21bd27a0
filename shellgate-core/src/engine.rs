use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use shellgate_bash_runner::{CommandExecutor, ProcessCommandExecutor};
use shellgate_config::ShellgateConfig;
use tracing::info;

use crate::error::ShellResult;
use crate::foreground::{ExecOutput, ForegroundExecutor};
use crate::gate::SecurityGate;
use crate::registry::{LogTail, ProcessEntry, ProcessRecord, ProcessRegistry, RegistryStore, StopOutcome};
use crate::session::SessionStore;
use crate::transfer::{TransferDirection, resolve_transfer_path};
use crate::workspace::WorkspaceManager;

/// Entry point for callers. Holds all engine state; share it behind an
/// `Arc` to serve concurrent requests.
pub struct ShellEngine {
    workspaces: WorkspaceManager,
    sessions: Arc<SessionStore>,
    foreground: ForegroundExecutor,
    registry: ProcessRegistry,
}

impl ShellEngine {
    /// Build an engine that runs commands through `sh -c`.
    pub fn new(config: &ShellgateConfig) -> Self {
        Self::with_executor(config, Arc::new(ProcessCommandExecutor::new()))
    }

    /// Build an engine whose foreground commands go through `executor`.
    pub fn with_executor(config: &ShellgateConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        let gate = Arc::new(SecurityGate::new(&config.security));
        let sessions = Arc::new(SessionStore::new());
        let foreground = ForegroundExecutor::new(
            Arc::clone(&gate),
            Arc::clone(&sessions),
            executor,
            &config.execution,
        );
        let registry = ProcessRegistry::load(
            gate,
            RegistryStore::new(&config.state.registry_path),
            &config.execution,
        );

        Self {
            workspaces: WorkspaceManager::new(&config.workspace.root),
            sessions,
            foreground,
            registry,
        }
    }

    pub fn ensure_workspace(&self, user: &str) -> ShellResult<PathBuf> {
        self.workspaces.ensure(user)
    }

    pub fn current_dir(&self, user: &str) -> ShellResult<PathBuf> {
        let root = self.workspaces.ensure(user)?;
        Ok(self.sessions.current_dir(user, &root))
    }

    /// Run a foreground command (or the `cd` pseudo-command).
    pub async fn execute(&self, user: &str, command: &str) -> ShellResult<ExecOutput> {
        let root = self.workspaces.ensure(user)?;
        self.foreground.run(user, &root, command).await
    }

    /// Start a supervised background command in the user's current directory.
    pub async fn spawn_background(&self, user: &str, command: &str) -> ShellResult<ProcessRecord> {
        let root = self.workspaces.ensure(user)?;
        let cwd = self.sessions.current_dir(user, &root);
        self.registry.spawn(user, &root, &cwd, command).await
    }

    pub async fn stop_background(&self, user: &str, id: usize) -> ShellResult<StopOutcome> {
        self.workspaces.ensure(user)?;
        self.registry.stop(user, id).await
    }

    pub fn list_background(&self, user: &str) -> ShellResult<Vec<ProcessEntry>> {
        self.workspaces.ensure(user)?;
        Ok(self.registry.list(user))
    }

    pub async fn tail_log(&self, user: &str, id: usize) -> ShellResult<LogTail> {
        self.workspaces.ensure(user)?;
        self.registry.tail(user, id).await
    }

    /// Workspace path for a file the user wants to send or fetch.
    pub fn resolve_transfer_path(
        &self,
        user: &str,
        name: &str,
        direction: TransferDirection,
    ) -> ShellResult<PathBuf> {
        let root = self.workspaces.ensure(user)?;
        let cwd = self.sessions.current_dir(user, &root);
        resolve_transfer_path(&root, &cwd, name, direction)
    }

    /// Persist registry changes that an earlier write failed to store.
    /// Does not touch the file when everything is on disk already.
    /// Background processes keep running.
    pub fn shutdown(&self) -> Result<()> {
        self.registry.flush()?;
        info!("engine shut down");
        Ok(())
    }
}
