//! Disposable workspace staging.
//!
//! A workspace is a copy of a base project skeleton at
//! `<parent>/<prefix>_temp_<unix millis>`. Generated files are written into it
//! and the caller either keeps it (for archiving or delivery) or discards it.
//! A workspace that is dropped without [`Workspace::keep`] is removed.

use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::codegen::error::WorkspaceError;
use crate::codegen::fs_utils::{copy_dir_recursive, remove_dir_if_exists};

#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    keep: bool,
}

impl Workspace {
    /// Copy `skeleton` into a fresh directory under `parent`.
    ///
    /// On failure any partially copied directory is removed before the error
    /// is returned.
    pub fn stage(skeleton: &Path, parent: &Path, prefix: &str) -> Result<Self, WorkspaceError> {
        if !skeleton.exists() {
            return Err(WorkspaceError::SkeletonMissing(skeleton.to_path_buf()));
        }
        if !skeleton.is_dir() {
            return Err(WorkspaceError::NotADirectory(skeleton.to_path_buf()));
        }

        std::fs::create_dir_all(parent).map_err(|source| WorkspaceError::DestinationNotWritable {
            path: parent.to_path_buf(),
            source,
        })?;

        let path = Self::unique_path(parent, prefix);
        debug!(skeleton = %skeleton.display(), workspace = %path.display(), "staging workspace");

        if let Err(source) = copy_dir_recursive(skeleton, &path) {
            if let Err(e) = remove_dir_if_exists(&path) {
                warn!(workspace = %path.display(), error = %e, "failed to remove partial workspace");
            }
            let kind = source.kind();
            return Err(if kind == std::io::ErrorKind::PermissionDenied {
                WorkspaceError::DestinationNotWritable { path, source }
            } else {
                WorkspaceError::Io { path, source }
            });
        }

        info!(workspace = %path.display(), "workspace staged");
        Ok(Workspace { path, keep: false })
    }

    /// `<parent>/<prefix>_temp_<millis>`, bumping the timestamp until unused
    fn unique_path(parent: &Path, prefix: &str) -> PathBuf {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let candidate = parent.join(format!("{}_temp_{}", prefix, millis));
            if !candidate.exists() {
                return candidate;
            }
            millis += 1;
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the workspace; it stays on disk
    pub fn keep(mut self) -> PathBuf {
        self.keep = true;
        self.path.clone()
    }

    /// Remove the workspace now
    pub fn discard(mut self) -> Result<(), WorkspaceError> {
        self.keep = true;
        remove_dir_if_exists(&self.path).map_err(|source| WorkspaceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(e) = remove_dir_if_exists(&self.path) {
            warn!(workspace = %self.path.display(), error = %e, "failed to remove workspace");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::fs_utils::write_file;
    use tempfile::TempDir;

    fn skeleton(root: &Path) -> PathBuf {
        let skeleton = root.join("skeleton");
        write_file(skeleton.join("pom.xml"), "<project/>").unwrap();
        skeleton
    }

    #[test]
    fn test_stage_names_and_copies() {
        let dir = TempDir::new().unwrap();
        let skeleton = skeleton(dir.path());

        let workspace = Workspace::stage(&skeleton, &dir.path().join("out"), "shop").unwrap();
        let name = workspace.path().file_name().unwrap().to_string_lossy().to_string();

        assert!(name.starts_with("shop_temp_"));
        assert!(name["shop_temp_".len()..].parse::<i64>().is_ok());
        assert!(workspace.path().join("pom.xml").exists());
    }

    #[test]
    fn test_drop_removes_unless_kept() {
        let dir = TempDir::new().unwrap();
        let skeleton = skeleton(dir.path());

        let dropped = Workspace::stage(&skeleton, dir.path(), "a").unwrap();
        let dropped_path = dropped.path().to_path_buf();
        drop(dropped);
        assert!(!dropped_path.exists());

        let kept = Workspace::stage(&skeleton, dir.path(), "b").unwrap().keep();
        assert!(kept.exists());
    }

    #[test]
    fn test_discard() {
        let dir = TempDir::new().unwrap();
        let skeleton = skeleton(dir.path());

        let workspace = Workspace::stage(&skeleton, dir.path(), "c").unwrap();
        let path = workspace.path().to_path_buf();
        workspace.discard().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_skeleton() {
        let dir = TempDir::new().unwrap();
        let err = Workspace::stage(&dir.path().join("nope"), dir.path(), "x").unwrap_err();
        assert!(matches!(err, WorkspaceError::SkeletonMissing(_)));
    }

    #[test]
    fn test_consecutive_stages_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let skeleton = skeleton(dir.path());

        let first = Workspace::stage(&skeleton, dir.path(), "same").unwrap();
        let second = Workspace::stage(&skeleton, dir.path(), "same").unwrap();
        assert_ne!(first.path(), second.path());
    }
}
