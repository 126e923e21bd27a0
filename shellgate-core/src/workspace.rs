use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ShellError, ShellResult};

/// Maps user identities to per-user directories under a shared root.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding every user workspace.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the canonical workspace path for `user`, creating it on first
    /// use. Idempotent.
    pub fn ensure(&self, user: &str) -> ShellResult<PathBuf> {
        validate_user_id(user)?;

        let path = self.root.join(user);
        if !path.is_dir() {
            fs::create_dir_all(&path)?;
            info!(user, path = %path.display(), "workspace created");
        }
        Ok(fs::canonicalize(&path)?)
    }
}

/// A user id must stay a single, non-hidden path component.
fn validate_user_id(user: &str) -> ShellResult<()> {
    let valid = !user.is_empty()
        && !user.starts_with('.')
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ShellError::InvalidUser {
            user: user.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_creates_and_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = WorkspaceManager::new(dir.path().join("workspaces"));

        let first = manager.ensure("u1").expect("create workspace");
        let second = manager.ensure("u1").expect("reuse workspace");

        assert_eq!(first, second);
        assert!(first.is_dir());
        assert!(first.is_absolute());
        assert_eq!(first.file_name().and_then(|n| n.to_str()), Some("u1"));
    }

    #[test]
    fn rejects_identities_that_are_not_one_component() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = WorkspaceManager::new(dir.path());

        for user in ["", "..", ".hidden", "a/b", "u 1", "../u2"] {
            assert!(
                matches!(manager.ensure(user), Err(ShellError::InvalidUser { .. })),
                "`{user}` should be rejected"
            );
        }
        assert!(manager.ensure("5206554804").is_ok());
        assert!(manager.ensure("team-a_1.dev").is_ok());
    }
}
