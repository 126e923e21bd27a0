use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Security gate tuning. The built-in allowlist lives in the engine; this
/// section can only widen it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SecurityConfig {
    /// Program names appended to the built-in allowlist.
    #[serde(default)]
    pub extra_allowed_commands: Vec<String>,
    /// Suffixes that mark a first token as a trusted user script.
    #[serde(default = "SecurityConfig::default_script_extensions")]
    pub script_extensions: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            extra_allowed_commands: Vec::new(),
            script_extensions: Self::default_script_extensions(),
        }
    }
}

impl SecurityConfig {
    fn default_script_extensions() -> Vec<String> {
        vec![".py".to_string(), ".sh".to_string(), ".js".to_string()]
    }

    pub fn validate(&self) -> Result<()> {
        for command in &self.extra_allowed_commands {
            ensure!(
                !command.trim().is_empty() && !command.contains(char::is_whitespace),
                "security.extra_allowed_commands entries must be single program names, got `{command}`"
            );
            ensure!(
                !command.contains('/'),
                "security.extra_allowed_commands entries must not contain `/`, got `{command}`"
            );
        }
        for extension in &self.script_extensions {
            ensure!(
                extension.starts_with('.') && extension.len() > 1,
                "security.script_extensions entries must look like `.ext`, got `{extension}`"
            );
        }
        Ok(())
    }
}
