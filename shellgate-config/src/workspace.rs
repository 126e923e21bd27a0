use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::APP_DIR_NAME;

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

/// Where per-user workspaces live.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Parent directory of every `<root>/<user>/` workspace.
    #[serde(default = "WorkspaceConfig::default_root")]
    pub root: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: Self::default_root(),
        }
    }
}

impl WorkspaceConfig {
    fn default_root() -> PathBuf {
        data_dir().join("workspaces")
    }
}

/// Where supervisor state is persisted.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct StateConfig {
    /// JSON document holding every user's background process records.
    #[serde(default = "StateConfig::default_registry_path")]
    pub registry_path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            registry_path: Self::default_registry_path(),
        }
    }
}

impl StateConfig {
    fn default_registry_path() -> PathBuf {
        data_dir().join("processes.json")
    }
}
