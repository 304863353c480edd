use crate::error::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PREFIX: &str = "iconforge-";

/// Uniquely named scratch directory owned by a single generation run.
///
/// The directory is removed when the value is dropped, on success and on every
/// error path alike, unless it was created with `keep` set.
pub struct Workspace {
    dir: Option<TempDir>,
    path: PathBuf,
    keep: bool,
}

impl Workspace {
    /// Creates the directory under `root`, or the system temp directory.
    pub fn create(root: Option<&Path>, keep: bool) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        let path = dir.path().to_path_buf();
        debug!("created workspace {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
            keep,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.path.join(rel)
    }

    /// Creates (if needed) and returns a sub directory.
    pub fn subdir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.path.join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        if self.keep {
            let path = dir.keep();
            warn!("keeping workspace {}", path.display());
        } else if let Err(e) = dir.close() {
            warn!("failed to remove workspace {}: {e}", self.path.display());
        } else {
            debug!("removed workspace {}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_on_drop() {
        let ws = Workspace::create(None, false).unwrap();
        let path = ws.path().to_path_buf();
        ws.subdir("icons").unwrap();
        assert!(path.join("icons").is_dir());
        drop(ws);
        assert!(!path.exists());
    }

    #[test]
    fn kept_when_requested() {
        let ws = Workspace::create(None, true).unwrap();
        let path = ws.path().to_path_buf();
        drop(ws);
        assert!(path.exists());
        std::fs::remove_dir_all(&path).unwrap();
    }

    #[test]
    fn unique_per_run() {
        let root = tempfile::tempdir().unwrap();
        let a = Workspace::create(Some(root.path()), false).unwrap();
        let b = Workspace::create(Some(root.path()), false).unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().starts_with(root.path()));
        assert!(a
            .path()
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with(PREFIX)));
    }
}
