//! Scoped staging directory for downloaded archives.
//!
//! A caller-supplied path is persistent and reused across runs (the archive
//! cache). Without one, a fresh temporary directory is created and removed
//! when the guard is dropped, on success, error and unwind alike.

use crate::error::{MirrorError, MirrorResult};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Lifetime of a [`WorkDir`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    Persistent,
    Ephemeral,
}

/// RAII guard over the staging directory. Ephemeral directories are deleted
/// exactly once, either by [`WorkDir::close`] or on drop.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
    temp: Option<TempDir>,
}

impl WorkDir {
    /// Resolve `requested` into a work dir. `None` allocates an ephemeral one.
    pub fn acquire(requested: Option<&Path>) -> MirrorResult<Self> {
        match requested {
            Some(dir) => Self::persistent(dir),
            None => Self::ephemeral(),
        }
    }

    fn persistent(dir: &Path) -> MirrorResult<Self> {
        if dir.exists() && !dir.is_dir() {
            return Err(MirrorError::InvalidPath {
                path: dir.to_path_buf(),
            });
        }
        fs::create_dir_all(dir).map_err(|e| MirrorError::io("create cache dir", dir, e))?;
        let path = std::path::absolute(dir).map_err(|e| MirrorError::io("resolve cache dir", dir, e))?;
        Ok(WorkDir { path, temp: None })
    }

    fn ephemeral() -> MirrorResult<Self> {
        let temp = tempfile::Builder::new()
            .prefix("datamirror-")
            .tempdir()
            .map_err(|e| MirrorError::io("create temp cache dir", std::env::temp_dir(), e))?;
        let path = temp.path().to_path_buf();
        tracing::debug!("allocated ephemeral cache dir {}", path.display());
        Ok(WorkDir {
            path,
            temp: Some(temp),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lifetime(&self) -> Lifetime {
        if self.temp.is_some() {
            Lifetime::Ephemeral
        } else {
            Lifetime::Persistent
        }
    }

    /// Release now and surface removal errors. No-op for persistent dirs.
    pub fn close(mut self) -> MirrorResult<()> {
        match self.temp.take() {
            Some(temp) => temp
                .close()
                .map_err(|e| MirrorError::io("remove temp cache dir", &self.path, e)),
            None => Ok(()),
        }
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Some(temp) = self.temp.take() {
            if let Err(e) = temp.close() {
                tracing::warn!("failed to remove temp cache dir {}: {}", self.path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistent_dir_is_created_with_parents() {
        let root = tempfile::tempdir().unwrap();
        let requested = root.path().join("a").join("b");
        let work = WorkDir::acquire(Some(&requested)).unwrap();
        assert_eq!(work.lifetime(), Lifetime::Persistent);
        assert!(work.path().is_absolute());
        assert!(requested.is_dir());
        drop(work);
        assert!(requested.is_dir(), "persistent dir must survive release");
    }

    #[test]
    fn existing_file_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("not_a_dir");
        fs::write(&file, b"x").unwrap();
        let err = WorkDir::acquire(Some(&file)).unwrap_err();
        assert!(matches!(err, MirrorError::InvalidPath { .. }));
    }

    #[test]
    fn ephemeral_dir_is_removed_on_drop() {
        let work = WorkDir::acquire(None).unwrap();
        let path = work.path().to_path_buf();
        assert_eq!(work.lifetime(), Lifetime::Ephemeral);
        fs::create_dir_all(path.join("nested")).unwrap();
        fs::write(path.join("nested").join("f.bin"), b"data").unwrap();
        drop(work);
        assert!(!path.exists());
    }

    #[test]
    fn ephemeral_dir_is_removed_on_close() {
        let work = WorkDir::acquire(None).unwrap();
        let path = work.path().to_path_buf();
        work.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn ephemeral_dir_is_removed_on_unwind() {
        let captured = std::sync::Mutex::new(None);
        let result = std::panic::catch_unwind(|| {
            let work = WorkDir::acquire(None).unwrap();
            *captured.lock().unwrap() = Some(work.path().to_path_buf());
            panic!("boom");
        });
        assert!(result.is_err());
        let path = captured.lock().unwrap().clone().expect("path captured");
        assert!(!path.exists());
    }
}
