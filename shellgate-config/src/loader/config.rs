use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::access::AccessConfig;
use crate::debug::DebugConfig;
use crate::execution::ExecutionConfig;
use crate::security::SecurityConfig;
use crate::workspace::{StateConfig, WorkspaceConfig};

/// Overrides the workspace parent directory.
pub const ENV_WORKSPACES_DIR: &str = "SHELLGATE_WORKSPACES_DIR";
/// Overrides the persisted registry location.
pub const ENV_REGISTRY_PATH: &str = "SHELLGATE_REGISTRY_PATH";

/// Main configuration structure for shellgate
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ShellgateConfig {
    /// Workspace layout
    #[serde(default)]
    pub workspace: WorkspaceConfig,

    /// Persisted supervisor state
    #[serde(default)]
    pub state: StateConfig,

    /// Foreground and background execution limits
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Security gate extensions
    #[serde(default)]
    pub security: SecurityConfig,

    /// Caller identities accepted by the front end
    #[serde(default)]
    pub access: AccessConfig,

    /// Logging settings
    #[serde(default)]
    pub debug: DebugConfig,
}

impl ShellgateConfig {
    pub fn validate(&self) -> Result<()> {
        self.execution
            .validate()
            .context("Invalid execution configuration")?;

        self.security
            .validate()
            .context("Invalid security configuration")?;

        Ok(())
    }

    /// Apply `SHELLGATE_*` overrides using the supplied variable lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = non_empty(lookup(ENV_WORKSPACES_DIR)) {
            self.workspace.root = PathBuf::from(root);
        }
        if let Some(path) = non_empty(lookup(ENV_REGISTRY_PATH)) {
            self.state.registry_path = PathBuf::from(path);
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
