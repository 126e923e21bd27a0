//! Configuration model and loader for shellgate.
//!
//! Every section is optional in `shellgate.toml`; missing keys fall back to
//! the defaults documented on each field. [`ConfigManager`] resolves the file
//! location, applies environment overrides, and validates the result.

pub mod access;
pub mod debug;
pub mod execution;
pub mod loader;
pub mod security;
pub mod workspace;

pub use access::AccessConfig;
pub use debug::{DebugConfig, TraceLevel};
pub use execution::ExecutionConfig;
pub use loader::{ConfigManager, ShellgateConfig};
pub use security::SecurityConfig;
pub use workspace::{StateConfig, WorkspaceConfig};

/// File name looked up in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "shellgate.toml";

/// Directory name used under the platform data/config directories.
pub const APP_DIR_NAME: &str = "shellgate";
