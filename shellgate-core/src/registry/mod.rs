//! Supervisor for background commands.
//!
//! Each spawn gets the next per-user id and a `process_<id>.log` in the
//! user's workspace. The whole registry is persisted after every spawn and
//! reloaded once at startup. Liveness is never stored: it is re-checked from
//! the recorded pid on every listing.

mod record;
mod store;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use hashbrown::HashMap;
use parking_lot::Mutex;
use shellgate_bash_runner::process_group::{
    is_process_group_running, is_process_running, terminate_process_group,
};
use shellgate_bash_runner::{TerminationOutcome, spawn_detached};
use shellgate_commons::truncate_tail;
use shellgate_config::ExecutionConfig;
use tracing::{debug, error, info};

use crate::error::{ShellError, ShellResult};
use crate::foreground::{bound_invocation, exec_failure};
use crate::gate::SecurityGate;

pub use record::{LogTail, ProcessEntry, ProcessRecord, ProcessStatus, StopOutcome};
pub use store::{RegistryMap, RegistryStore};

/// Serializes writes of the registry file and remembers the newest
/// generation on disk, so an older snapshot never replaces a newer one.
#[derive(Debug, Default)]
struct Writer {
    written: u64,
}

impl Writer {
    fn write(&mut self, store: &RegistryStore, snapshot: &RegistryMap, generation: u64) -> anyhow::Result<()> {
        if generation <= self.written {
            return Ok(());
        }
        store.save(snapshot)?;
        self.written = generation;
        Ok(())
    }
}

pub struct ProcessRegistry {
    gate: Arc<SecurityGate>,
    store: RegistryStore,
    records: Mutex<RegistryMap>,
    /// Bumped under the `records` lock on every mutation.
    generation: AtomicU64,
    writer: Arc<Mutex<Writer>>,
    user_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    grace_period: Duration,
    tail_max_chars: usize,
}

impl ProcessRegistry {
    /// Load the persisted registry from `store`.
    pub fn load(gate: Arc<SecurityGate>, store: RegistryStore, config: &ExecutionConfig) -> Self {
        let records = store.load();
        let total: usize = records.values().map(Vec::len).sum();
        debug!(path = %store.path().display(), users = records.len(), records = total, "process registry loaded");

        Self {
            gate,
            store,
            records: Mutex::new(records),
            generation: AtomicU64::new(0),
            writer: Arc::new(Mutex::new(Writer::default())),
            user_locks: Mutex::new(HashMap::new()),
            grace_period: config.stop_grace_period(),
            tail_max_chars: config.tail_max_chars,
        }
    }

    fn user_lock(&self, user: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.user_locks
            .lock()
            .entry_ref(user)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Gate `command`, then launch it detached in `cwd` with its output in
    /// `process_<id>.log` under `root`.
    pub async fn spawn(&self, user: &str, root: &Path, cwd: &Path, command: &str) -> ShellResult<ProcessRecord> {
        let command = command.trim();
        if command.is_empty() {
            return Err(ShellError::EmptyCommand);
        }
        if let Err(err) = self.gate.check(command, root, cwd).into_result() {
            info!(user, kind = err.kind(), command, "background command denied");
            return Err(err);
        }

        let lock = self.user_lock(user);
        let _guard = lock.lock().await;

        let id = self.records.lock().get(user).map_or(0, Vec::len);
        let log_file = root.join(format!("process_{id}.log"));
        let invocation = bound_invocation(command, user, root, cwd);
        let process = spawn_detached(&invocation, &log_file).map_err(exec_failure)?;

        let record = ProcessRecord {
            id,
            pid: process.pid,
            command: command.to_string(),
            cwd: cwd.to_path_buf(),
            log_file,
            started: Utc::now(),
        };
        {
            let mut records = self.records.lock();
            records
                .entry(user.to_string())
                .or_default()
                .push(record.clone());
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        info!(user, id, pid = record.pid, command, "background process started");

        // The process is running either way; a failed write is retried on the
        // next mutation or at shutdown.
        if let Err(err) = self.persist().await {
            error!(user, id, error = %format!("{err:#}"), "failed to persist process registry");
        }
        Ok(record)
    }

    /// Every record of `user` with its current liveness.
    pub fn list(&self, user: &str) -> Vec<ProcessEntry> {
        let records = self.records.lock().get(user).cloned().unwrap_or_default();
        records
            .into_iter()
            .map(|record| {
                let status = if is_process_running(record.pid) {
                    ProcessStatus::Running
                } else {
                    ProcessStatus::Stopped
                };
                ProcessEntry { record, status }
            })
            .collect()
    }

    pub fn get(&self, user: &str, id: usize) -> ShellResult<ProcessRecord> {
        self.records
            .lock()
            .get(user)
            .and_then(|records| records.get(id))
            .cloned()
            .ok_or(ShellError::ProcessNotFound { id })
    }

    /// Terminate the process group of record `id`: SIGTERM, then SIGKILL
    /// after the grace period.
    ///
    /// Members the command left behind are signalled even when the command
    /// itself has already exited.
    pub async fn stop(&self, user: &str, id: usize) -> ShellResult<StopOutcome> {
        let record = self.get(user, id)?;
        if !is_process_group_running(record.pid) {
            info!(user, id, pid = record.pid, "process already stopped");
            return Ok(StopOutcome::AlreadyStopped);
        }

        let pid = record.pid;
        let grace_period = self.grace_period;
        let result = tokio::task::spawn_blocking(move || terminate_process_group(pid, grace_period))
            .await
            .map_err(|err| ShellError::StopFailure {
                id,
                reason: err.to_string(),
            })?;

        let outcome = match result {
            Ok(TerminationOutcome::GracefulExit) => StopOutcome::Stopped { forced: false },
            Ok(TerminationOutcome::ForcefulKill) => StopOutcome::Stopped { forced: true },
            Ok(TerminationOutcome::AlreadyExited) => StopOutcome::AlreadyStopped,
            Err(err) => {
                error!(user, id, pid, error = %err, "failed to signal process group");
                return Err(ShellError::StopFailure {
                    id,
                    reason: err.to_string(),
                });
            }
        };
        info!(user, id, pid, outcome = ?outcome, "stop requested");
        Ok(outcome)
    }

    /// Last `tail_max_chars` characters of the log of record `id`.
    pub async fn tail(&self, user: &str, id: usize) -> ShellResult<LogTail> {
        let record = self.get(user, id)?;
        let bytes = match tokio::fs::read(&record.log_file).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(LogTail::Missing),
            Err(err) => return Err(ShellError::LogUnavailable(err.to_string())),
        };
        if bytes.is_empty() {
            return Ok(LogTail::Empty);
        }

        let content = String::from_utf8_lossy(&bytes);
        Ok(LogTail::Content(
            truncate_tail(&content, self.tail_max_chars).into_owned(),
        ))
    }

    /// Write the registry if it holds changes that are not on disk yet.
    /// A registry that only served reads leaves the file untouched.
    pub fn flush(&self) -> anyhow::Result<()> {
        let (snapshot, generation) = self.snapshot();
        let mut writer = self.writer.lock();
        if generation <= writer.written {
            debug!("process registry already persisted");
            return Ok(());
        }
        writer.write(&self.store, &snapshot, generation)
    }

    fn snapshot(&self) -> (RegistryMap, u64) {
        let records = self.records.lock();
        (records.clone(), self.generation.load(Ordering::SeqCst))
    }

    async fn persist(&self) -> anyhow::Result<()> {
        let (snapshot, generation) = self.snapshot();
        let store = self.store.clone();
        let writer = Arc::clone(&self.writer);
        tokio::task::spawn_blocking(move || writer.lock().write(&store, &snapshot, generation))
            .await
            .context("registry writer task failed")?
    }
}
