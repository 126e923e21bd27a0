use std::path::{Path, PathBuf};

use shellgate_commons::{canonicalize_lenient, is_within};

use crate::error::{ShellError, ShellResult};
use crate::session::{resolve_user_path, workspace_display};

/// Which way a file is moving between the user and the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    /// The user sends a file into the workspace.
    Upload,
    /// The user fetches a file from the workspace.
    Download,
}

/// Resolve a file name for a transfer the same way `cd` resolves targets.
///
/// Downloads must name an existing file; uploads need an existing parent
/// directory and may overwrite a file but never a directory.
pub fn resolve_transfer_path(
    root: &Path,
    current_dir: &Path,
    name: &str,
    direction: TransferDirection,
) -> ShellResult<PathBuf> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ShellError::InvalidPath("file name is empty".to_string()));
    }

    let resolved = canonicalize_lenient(&resolve_user_path(root, current_dir, name));
    if !is_within(root, &resolved) {
        return Err(ShellError::ContainmentViolation {
            path: name.to_string(),
        });
    }
    if resolved.is_dir() {
        return Err(ShellError::InvalidPath(format!(
            "`{}` is a directory",
            workspace_display(root, &resolved)
        )));
    }

    match direction {
        TransferDirection::Download if !resolved.is_file() => Err(ShellError::FileNotFound {
            path: workspace_display(root, &resolved),
        }),
        TransferDirection::Upload if !resolved.parent().is_some_and(Path::is_dir) => {
            let parent = resolved.parent().unwrap_or(root);
            Err(ShellError::DirectoryNotFound {
                path: workspace_display(root, parent),
            })
        }
        _ => Ok(resolved),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn workspace() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("u1");
        fs::create_dir_all(root.join("docs")).expect("mkdir");
        fs::write(root.join("docs/report.txt"), "data").expect("write");
        let root = fs::canonicalize(root).expect("canonical");
        (dir, root)
    }

    #[test]
    fn download_existing_file() {
        let (_dir, root) = workspace();
        let resolved =
            resolve_transfer_path(&root, &root, "docs/report.txt", TransferDirection::Download)
                .expect("resolve");
        assert_eq!(resolved, root.join("docs/report.txt"));

        let from_docs =
            resolve_transfer_path(&root, &root.join("docs"), "report.txt", TransferDirection::Download)
                .expect("resolve relative");
        assert_eq!(from_docs, resolved);
    }

    #[test]
    fn download_missing_file_is_not_found() {
        let (_dir, root) = workspace();
        let result = resolve_transfer_path(&root, &root, "/docs/nope.txt", TransferDirection::Download);
        assert!(matches!(
            result,
            Err(ShellError::FileNotFound { ref path }) if path == "~/docs/nope.txt"
        ));
    }

    #[test]
    fn upload_needs_existing_parent() {
        let (_dir, root) = workspace();
        assert_eq!(
            resolve_transfer_path(&root, &root, "~/docs/new.bin", TransferDirection::Upload)
                .expect("upload target"),
            root.join("docs/new.bin")
        );
        assert!(matches!(
            resolve_transfer_path(&root, &root, "missing/new.bin", TransferDirection::Upload),
            Err(ShellError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn rejects_directories_blank_names_and_escapes() {
        let (_dir, root) = workspace();
        assert!(matches!(
            resolve_transfer_path(&root, &root, "docs", TransferDirection::Download),
            Err(ShellError::InvalidPath(_))
        ));
        assert!(matches!(
            resolve_transfer_path(&root, &root, "  ", TransferDirection::Upload),
            Err(ShellError::InvalidPath(_))
        ));
        assert!(matches!(
            resolve_transfer_path(&root, &root, "../u2/secret", TransferDirection::Upload),
            Err(ShellError::ContainmentViolation { .. })
        ));
    }
}
