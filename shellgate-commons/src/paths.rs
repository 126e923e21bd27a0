use anyhow::{Result, bail};
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Normalize a path by resolving `.` and `..` components lexically.
///
/// `..` at the filesystem root is dropped, so `/a/../../b` becomes `/b`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                normalized.pop();
            }
            Component::CurDir => {}
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

/// Canonicalize a path with fallback to the original path if canonicalization fails.
pub fn canonicalize_workspace(workspace_root: &Path) -> PathBuf {
    std::fs::canonicalize(workspace_root).unwrap_or_else(|error| {
        warn!(
            path = %workspace_root.display(),
            %error,
            "Failed to canonicalize workspace root; falling back to provided path"
        );
        workspace_root.to_path_buf()
    })
}

/// Resolve `path` the way the kernel would walk it, tolerating a missing
/// tail.
///
/// Components are resolved against the filesystem from the left, so a
/// symlink followed by `..` climbs from the link target. Once a component
/// does not exist, the rest is normalized lexically on top of what was
/// resolved so far.
pub fn canonicalize_lenient(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    let mut components = path.components();

    while let Some(component) = components.next() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir | Component::Normal(_) => {
                let candidate = resolved.join(component.as_os_str());
                match std::fs::canonicalize(&candidate) {
                    Ok(canonical) => resolved = canonical,
                    Err(_) => return normalize_path(&candidate.join(components.as_path())),
                }
            }
        }
    }
    resolved
}

/// Component-wise containment check. `/w/u10` is not within `/w/u1`.
pub fn is_within(root: &Path, path: &Path) -> bool {
    path.starts_with(root)
}

/// Fail unless `path` lies inside `root`.
pub fn ensure_within(root: &Path, path: &Path) -> Result<()> {
    if !is_within(root, path) {
        bail!(
            "path `{}` escapes the workspace root `{}`",
            path.display(),
            root.display()
        );
    }
    Ok(())
}

/// Resolve `user_path` against `base` and return its canonical form, which is
/// guaranteed to reside inside `workspace_root`.
///
/// Relative paths are joined onto `base`; absolute paths are taken as-is.
/// The target does not need to exist.
pub fn secure_path(workspace_root: &Path, base: &Path, user_path: &Path) -> Result<PathBuf> {
    let joined = if user_path.is_absolute() {
        user_path.to_path_buf()
    } else {
        base.join(user_path)
    };

    let canonical = canonicalize_lenient(&joined);
    let root = canonicalize_workspace(workspace_root);
    ensure_within(&root, &canonical)?;
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalizes_parent_components() {
        assert_eq!(
            normalize_path(Path::new("/w/u1/a/../b/./c")),
            PathBuf::from("/w/u1/b/c")
        );
        assert_eq!(normalize_path(Path::new("/../../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn containment_is_component_wise() {
        assert!(is_within(Path::new("/w/u1"), Path::new("/w/u1/src")));
        assert!(is_within(Path::new("/w/u1"), Path::new("/w/u1")));
        assert!(!is_within(Path::new("/w/u1"), Path::new("/w/u10")));
        assert!(!is_within(Path::new("/w/u1"), Path::new("/w")));
    }

    #[test]
    fn lenient_canonicalization_keeps_missing_tail() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = std::fs::canonicalize(dir.path()).expect("canonical root");
        let resolved = canonicalize_lenient(&root.join("missing/./nested/../file.txt"));
        assert_eq!(resolved, root.join("missing/file.txt"));
    }

    #[test]
    fn secure_path_rejects_escape() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = std::fs::canonicalize(dir.path()).expect("canonical root");
        let workspace = root.join("u1");
        std::fs::create_dir_all(&workspace).expect("workspace");

        assert!(secure_path(&workspace, &workspace, Path::new("../../u2")).is_err());
        assert!(secure_path(&workspace, &workspace, Path::new("/etc/passwd")).is_err());

        let inside = secure_path(&workspace, &workspace, Path::new("a/../b")).expect("inside");
        assert_eq!(inside, workspace.join("b"));
    }

    #[cfg(unix)]
    #[test]
    fn parent_of_symlink_climbs_from_link_target() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = std::fs::canonicalize(dir.path()).expect("canonical root");
        let workspace = root.join("u1");
        let target = root.join("outside").join("deep");
        std::fs::create_dir_all(&workspace).expect("workspace");
        std::fs::create_dir_all(&target).expect("target");
        std::os::unix::fs::symlink(&target, workspace.join("link")).expect("symlink");

        assert_eq!(
            canonicalize_lenient(&workspace.join("link/../x")),
            root.join("outside").join("x")
        );
        assert!(secure_path(&workspace, &workspace, Path::new("link/../x")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn secure_path_follows_existing_symlinks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = std::fs::canonicalize(dir.path()).expect("canonical root");
        let workspace = root.join("u1");
        let outside = root.join("outside");
        std::fs::create_dir_all(&workspace).expect("workspace");
        std::fs::create_dir_all(&outside).expect("outside");
        std::os::unix::fs::symlink(&outside, workspace.join("link")).expect("symlink");

        assert!(secure_path(&workspace, &workspace, Path::new("link/file")).is_err());
    }
}
