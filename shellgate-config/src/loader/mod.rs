pub mod config;
pub mod manager;

pub use config::{ENV_REGISTRY_PATH, ENV_WORKSPACES_DIR, ShellgateConfig};
pub use manager::{ConfigManager, ENV_CONFIG_PATH};
