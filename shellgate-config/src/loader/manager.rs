use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::loader::config::ShellgateConfig;
use crate::{APP_DIR_NAME, CONFIG_FILE_NAME};

/// Points at an explicit configuration file.
pub const ENV_CONFIG_PATH: &str = "SHELLGATE_CONFIG";

/// Configuration manager for loading and validating configurations
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: ShellgateConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from `explicit` or the default locations, then
    /// apply environment overrides.
    ///
    /// Lookup order: `explicit`, `SHELLGATE_CONFIG`, `./shellgate.toml`,
    /// `<config_dir>/shellgate/shellgate.toml`, built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut manager = match Self::locate(explicit) {
            Some(path) => Self::load_from_file(&path)?,
            None => {
                debug!("no configuration file found; using defaults");
                Self::from_config(ShellgateConfig::default())
            }
        };

        manager
            .config
            .apply_env_overrides(|key| std::env::var(key).ok());
        manager
            .config
            .validate()
            .context("Invalid configuration after environment overrides")?;
        Ok(manager)
    }

    fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        if let Ok(config_path) = std::env::var(ENV_CONFIG_PATH) {
            let trimmed = config_path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }

        if let Ok(cwd) = std::env::current_dir() {
            let candidate = cwd.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .filter(|candidate| candidate.is_file())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ShellgateConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        debug!(path = %path.display(), "loaded configuration file");
        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    pub fn from_config(config: ShellgateConfig) -> Self {
        Self {
            config,
            config_path: None,
        }
    }

    pub fn config(&self) -> &ShellgateConfig {
        &self.config
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn into_config(self) -> ShellgateConfig {
        self.config
    }
}
