use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::Builder;
use tracing::{debug, warn};

use super::record::ProcessRecord;

/// User id to that user's records, in id order.
pub type RegistryMap = BTreeMap<String, Vec<ProcessRecord>>;

/// The registry file: one JSON document rewritten whole on every change.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the registry. A missing or unreadable file yields an empty map.
    pub fn load(&self) -> RegistryMap {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no process registry yet");
                return RegistryMap::new();
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to read process registry; starting empty");
                return RegistryMap::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "corrupt process registry; starting empty");
                RegistryMap::new()
            }
        }
    }

    /// Atomically replace the registry file with `map`.
    pub fn save(&self, map: &RegistryMap) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create registry directory {}", parent.display()))?;

        let contents = serde_json::to_vec_pretty(map).context("failed to serialize process registry")?;
        let mut temp_file = Builder::new()
            .prefix(".processes")
            .tempfile_in(parent)
            .context("failed to create temporary registry file")?;
        temp_file
            .write_all(&contents)
            .context("failed to write temporary registry file")?;
        temp_file
            .as_file_mut()
            .sync_all()
            .context("failed to flush registry file to disk")?;
        temp_file
            .persist(&self.path)
            .map_err(|error| error.error)
            .with_context(|| format!("failed to persist registry to {}", self.path.display()))?;
        Ok(())
    }
}
