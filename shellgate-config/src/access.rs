use serde::{Deserialize, Serialize};

/// Caller identities accepted by the front end.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AccessConfig {
    /// Identities allowed to use the shell. Empty accepts everyone.
    #[serde(default)]
    pub allowed_users: Vec<String>,
}

impl AccessConfig {
    pub fn is_allowed(&self, user: &str) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.iter().any(|allowed| allowed == user)
    }
}
