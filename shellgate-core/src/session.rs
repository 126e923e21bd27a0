//! Per-user working directory cursor.
//!
//! The cursor always points at an existing directory inside the owning
//! workspace. It lives in memory only; a restart puts every user back at
//! their workspace root.

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use parking_lot::RwLock;
use shellgate_commons::{canonicalize_lenient, is_within};
use tracing::debug;

use crate::error::{ShellError, ShellResult};

#[derive(Debug, Default)]
pub struct SessionStore {
    cursors: RwLock<HashMap<String, PathBuf>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current directory of `user`, defaulting to `root`.
    ///
    /// A cursor whose directory was removed since it was set falls back to
    /// the workspace root.
    pub fn current_dir(&self, user: &str, root: &Path) -> PathBuf {
        if let Some(dir) = self.cursors.read().get(user)
            && dir.is_dir()
            && is_within(root, dir)
        {
            return dir.clone();
        }

        let mut cursors = self.cursors.write();
        if cursors.remove(user).is_some() {
            debug!(user, "session directory vanished; resetting to workspace root");
        }
        root.to_path_buf()
    }

    /// Move the cursor of `user` to `candidate`.
    ///
    /// Fails without touching the session when the candidate leaves the
    /// workspace or is not an existing directory.
    pub fn set_current_dir(&self, user: &str, root: &Path, candidate: &Path) -> ShellResult<PathBuf> {
        let resolved = canonicalize_lenient(candidate);
        if !is_within(root, &resolved) {
            return Err(ShellError::ContainmentViolation {
                path: candidate.display().to_string(),
            });
        }
        if !resolved.is_dir() {
            return Err(ShellError::DirectoryNotFound {
                path: workspace_display(root, &resolved),
            });
        }

        self.cursors
            .write()
            .insert(user.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// Interpret the `cd` pseudo-command.
    ///
    /// - no argument reports the current directory
    /// - `~` returns to the workspace root
    /// - a path made only of `..` climbs and stops at the workspace root
    /// - `/x` and `~/x` are rooted at the workspace
    /// - anything else is relative to the current directory
    pub fn change_directory(&self, user: &str, root: &Path, arg: Option<&str>) -> ShellResult<PathBuf> {
        let current = self.current_dir(user, root);
        let Some(arg) = arg.map(str::trim).filter(|arg| !arg.is_empty()) else {
            return Ok(current);
        };

        if let Some(hops) = parent_hops(arg) {
            let mut target = current.as_path();
            for _ in 0..hops {
                match target.parent() {
                    Some(parent) if target != root && is_within(root, parent) => target = parent,
                    _ => {
                        target = root;
                        break;
                    }
                }
            }
            let target = target.to_path_buf();
            return self.set_current_dir(user, root, &target);
        }

        let candidate = resolve_user_path(root, &current, arg);
        self.set_current_dir(user, root, &candidate)
    }
}

/// Join a user-supplied path onto the workspace. `~`, `~/x` and `/x` are
/// rooted at `root`; anything else is relative to `current`.
///
/// The result is not validated.
pub fn resolve_user_path(root: &Path, current: &Path, arg: &str) -> PathBuf {
    if arg == "~" {
        return root.to_path_buf();
    }
    if let Some(rest) = arg.strip_prefix("~/") {
        return root.join(rest.trim_start_matches('/'));
    }
    if arg.starts_with('/') {
        return root.join(arg.trim_start_matches('/'));
    }
    current.join(arg)
}

/// Render `path` the way users see it: `~` for the workspace root and
/// `~/sub` below it.
pub fn workspace_display(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.display().to_string(),
    }
}

/// Number of levels to climb if `arg` only consists of `..` (and `.`)
/// segments.
fn parent_hops(arg: &str) -> Option<usize> {
    let hops = arg
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .try_fold(0usize, |hops, segment| (segment == "..").then_some(hops + 1))?;
    (hops > 0).then_some(hops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn workspace() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("u1");
        fs::create_dir_all(root.join("src/nested")).expect("mkdir");
        let root = fs::canonicalize(root).expect("canonical");
        (dir, root)
    }

    #[test]
    fn defaults_to_workspace_root() {
        let (_dir, root) = workspace();
        let store = SessionStore::new();
        assert_eq!(store.current_dir("u1", &root), root);
        assert_eq!(store.change_directory("u1", &root, None).expect("report"), root);
    }

    #[test]
    fn parent_of_root_is_clamped() {
        let (_dir, root) = workspace();
        let store = SessionStore::new();

        assert_eq!(store.change_directory("u1", &root, Some("..")).expect("cd .."), root);
        assert_eq!(
            store.change_directory("u1", &root, Some("../../../")).expect("cd ../../../"),
            root
        );
    }

    #[test]
    fn climbs_then_clamps() {
        let (_dir, root) = workspace();
        let store = SessionStore::new();

        let nested = store
            .change_directory("u1", &root, Some("src/nested"))
            .expect("cd src/nested");
        assert_eq!(nested, root.join("src/nested"));

        let up = store.change_directory("u1", &root, Some("..")).expect("cd ..");
        assert_eq!(up, root.join("src"));

        let clamped = store
            .change_directory("u1", &root, Some("../../../.."))
            .expect("cd ../../../..");
        assert_eq!(clamped, root);
    }

    #[test]
    fn absolute_and_tilde_paths_are_rooted_at_workspace() {
        let (_dir, root) = workspace();
        let store = SessionStore::new();

        store.change_directory("u1", &root, Some("src")).expect("cd src");
        assert_eq!(
            store.change_directory("u1", &root, Some("/src/nested")).expect("cd /src/nested"),
            root.join("src/nested")
        );
        assert_eq!(store.change_directory("u1", &root, Some("~")).expect("cd ~"), root);
        assert_eq!(
            store.change_directory("u1", &root, Some("~/src")).expect("cd ~/src"),
            root.join("src")
        );
    }

    #[test]
    fn escaping_relative_path_fails_without_moving() {
        let (dir, root) = workspace();
        fs::create_dir_all(dir.path().join("u2")).expect("mkdir u2");
        let store = SessionStore::new();
        store.change_directory("u1", &root, Some("src")).expect("cd src");

        let result = store.change_directory("u1", &root, Some("../../u2"));
        assert!(matches!(result, Err(ShellError::ContainmentViolation { .. })));
        assert_eq!(store.current_dir("u1", &root), root.join("src"));
    }

    #[test]
    fn missing_directory_is_reported() {
        let (_dir, root) = workspace();
        let store = SessionStore::new();

        let result = store.change_directory("u1", &root, Some("nope"));
        assert!(matches!(
            result,
            Err(ShellError::DirectoryNotFound { ref path }) if path == "~/nope"
        ));
    }

    #[test]
    fn removed_directory_falls_back_to_root() {
        let (_dir, root) = workspace();
        let store = SessionStore::new();
        store.change_directory("u1", &root, Some("src/nested")).expect("cd");

        fs::remove_dir_all(root.join("src/nested")).expect("rm");
        assert_eq!(store.current_dir("u1", &root), root);
    }

    #[test]
    fn sessions_are_per_user() {
        let (dir, root) = workspace();
        let other = dir.path().join("u2");
        fs::create_dir_all(&other).expect("mkdir");
        let other = fs::canonicalize(other).expect("canonical");
        let store = SessionStore::new();

        store.change_directory("u1", &root, Some("src")).expect("cd");
        assert_eq!(store.current_dir("u2", &other), other);
    }

    #[test]
    fn workspace_display_uses_tilde() {
        let root = Path::new("/w/u1");
        assert_eq!(workspace_display(root, root), "~");
        assert_eq!(workspace_display(root, Path::new("/w/u1/a/b")), "~/a/b");
        assert_eq!(workspace_display(root, Path::new("/w/u2")), "/w/u2");
    }
}
