use shellgate_config::AccessConfig;
use shellgate_core::{ShellError, ShellResult};
use tracing::warn;

/// Decides which caller identities may reach the engine. The engine itself
/// trusts whatever identity it is given.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    config: AccessConfig,
}

impl AccessPolicy {
    pub fn new(config: AccessConfig) -> Self {
        Self { config }
    }

    pub fn authorize(&self, user: &str) -> ShellResult<()> {
        if self.config.is_allowed(user) {
            return Ok(());
        }
        warn!(user, "unauthorized caller rejected");
        Err(ShellError::AuthorizationDenied {
            user: user.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_policy_accepts_everyone() {
        assert!(AccessPolicy::new(AccessConfig::default()).authorize("anyone").is_ok());
    }

    #[test]
    fn restricted_policy_rejects_strangers() {
        let policy = AccessPolicy::new(AccessConfig {
            allowed_users: vec!["5206554804".to_string()],
        });
        assert!(policy.authorize("5206554804").is_ok());
        assert!(matches!(
            policy.authorize("42"),
            Err(ShellError::AuthorizationDenied { ref user }) if user == "42"
        ));
    }
}
