use std::path::{Path, PathBuf};
use thiserror::Error;

/// Workspace boundary for write-back: rewritten files must live inside the
/// repository and outside installed dependencies and package-manager caches.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    /// Canonical repository root
    workspace_root: PathBuf,
    /// Canonical paths to forbidden directories
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("Path is outside workspace: {path} (workspace: {workspace})")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("Path is in forbidden directory: {path} (forbidden: {forbidden})")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("Failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

/// Package-manager stores under the home directory.
const HOME_CACHES: &[&str] = &[".npm", ".pnpm-store", ".yarn", ".cache/yarn"];

impl WorkspaceGuard {
    /// Create a guard for `workspace_root`, canonicalized so symlinked roots
    /// compare correctly.
    pub fn new(workspace_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let workspace_root = workspace_root.as_ref().canonicalize()?;
        let mut forbidden_paths = Vec::new();

        if let Some(home) = home::home_dir() {
            for cache in HOME_CACHES {
                if let Ok(path) = home.join(cache).canonicalize() {
                    forbidden_paths.push(path);
                }
            }
        }

        // Installed dependencies within the workspace
        if let Ok(node_modules) = workspace_root.join("node_modules").canonicalize() {
            forbidden_paths.push(node_modules);
        }

        Ok(Self {
            workspace_root,
            forbidden_paths,
        })
    }

    /// Check if a path is safe to write. Returns the canonical path.
    ///
    /// Call immediately before writing; the path is resolved at call time.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        };

        // Resolves symlinks and .. components
        let canonical = absolute.canonicalize()?;

        if !canonical.starts_with(&self.workspace_root) {
            return Err(SafetyError::OutsideWorkspace {
                path: canonical,
                workspace: self.workspace_root.clone(),
            });
        }

        // Nested node_modules anywhere below the root are dependencies too
        let relative = canonical
            .strip_prefix(&self.workspace_root)
            .unwrap_or(&canonical);
        if relative.components().any(|c| c.as_os_str() == "node_modules") {
            return Err(SafetyError::ForbiddenPath {
                forbidden: self.workspace_root.join("node_modules"),
                path: canonical,
            });
        }

        if let Some(forbidden) = self
            .forbidden_paths
            .iter()
            .find(|forbidden| canonical.starts_with(forbidden))
        {
            return Err(SafetyError::ForbiddenPath {
                path: canonical.clone(),
                forbidden: forbidden.clone(),
            });
        }

        Ok(canonical)
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Create a guard with custom forbidden paths (for testing).
    #[cfg(test)]
    pub fn with_forbidden(
        workspace_root: impl AsRef<Path>,
        forbidden: Vec<PathBuf>,
    ) -> Result<Self, SafetyError> {
        let workspace_root = workspace_root.as_ref().canonicalize()?;
        let forbidden_paths = forbidden
            .into_iter()
            .map(|path| path.canonicalize())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            workspace_root,
            forbidden_paths,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn file_inside_workspace() {
        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = temp_dir.path();
        let guard = WorkspaceGuard::new(workspace).unwrap();

        let file = workspace.join("src/app.test.ts");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"").unwrap();

        assert!(guard.validate_path(&file).is_ok());
        assert!(guard.validate_path("src/app.test.ts").is_ok());
    }

    #[test]
    fn file_outside_workspace() {
        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = temp_dir.path().join("workspace");
        fs::create_dir_all(&workspace).unwrap();
        let guard = WorkspaceGuard::new(&workspace).unwrap();

        let outside = temp_dir.path().join("outside.test.ts");
        fs::write(&outside, b"").unwrap();

        assert!(matches!(
            guard.validate_path(&outside),
            Err(SafetyError::OutsideWorkspace { .. })
        ));
    }

    #[test]
    fn nested_node_modules_is_forbidden() {
        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = temp_dir.path();
        let guard = WorkspaceGuard::new(workspace).unwrap();

        let file = workspace.join("packages/web/node_modules/lib/index.test.ts");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"").unwrap();

        assert!(matches!(
            guard.validate_path(&file),
            Err(SafetyError::ForbiddenPath { .. })
        ));
    }

    #[test]
    fn custom_forbidden_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = temp_dir.path();
        let vendored = workspace.join("vendor");
        fs::create_dir_all(&vendored).unwrap();

        let guard = WorkspaceGuard::with_forbidden(workspace, vec![vendored.clone()]).unwrap();

        let file = vendored.join("lib.test.ts");
        fs::write(&file, b"").unwrap();

        assert!(matches!(
            guard.validate_path(&file),
            Err(SafetyError::ForbiddenPath { .. })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn symlink_escape_is_rejected() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = temp_dir.path().join("workspace");
        fs::create_dir_all(&workspace).unwrap();

        let outside = temp_dir.path().join("outside.test.ts");
        fs::write(&outside, b"").unwrap();

        let link = workspace.join("escape.test.ts");
        symlink(&outside, &link).unwrap();

        let guard = WorkspaceGuard::new(&workspace).unwrap();
        assert!(matches!(
            guard.validate_path(&link),
            Err(SafetyError::OutsideWorkspace { .. })
        ));
    }
}
