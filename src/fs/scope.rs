//! Subtree scoping
//!
//! A bundle may live in a subdirectory of its repository. Scoping restricts
//! the view to that subdirectory after checking, lexically, that it cannot
//! point outside the repository.

use std::io::Read;
use std::sync::Arc;

use crate::error::{Result, UnpackError, fs, validation};

use super::path;
use super::storage::{Metadata, Storage};

const ESCAPE_REASON: &str = "directory can not start with '../' or '/'";

/// Storage confined to one directory of another storage
pub struct Subtree {
    inner: Arc<dyn Storage>,
    base: String,
}

impl Subtree {
    /// Path of this subtree inside the wrapped storage
    pub fn base(&self) -> &str {
        &self.base
    }

    fn resolve(&self, path: &str) -> String {
        path::join(&self.base, path)
    }

    /// Re-label errors with the path the caller used, not the inner one
    fn relabel(err: UnpackError, path: &str) -> UnpackError {
        match err {
            UnpackError::NotFound { op, .. } => fs::not_found(op, path),
            UnpackError::IsADirectory { op, .. } => fs::is_a_directory(op, path),
            UnpackError::NotADirectory { op, .. } => fs::not_a_directory(op, path),
            other => other,
        }
    }
}

impl Storage for Subtree {
    fn stat(&self, path: &str) -> Result<Metadata> {
        self.inner
            .stat(&self.resolve(path))
            .map_err(|e| Self::relabel(e, path))
    }

    fn read_dir(&self, path: &str) -> Result<Vec<Metadata>> {
        self.inner
            .read_dir(&self.resolve(path))
            .map_err(|e| Self::relabel(e, path))
    }

    fn open_file(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        self.inner
            .open_file(&self.resolve(path))
            .map_err(|e| Self::relabel(e, path))
    }
}

/// Lexically check a requested subdirectory.
///
/// Returns the cleaned relative path, or `None` when no scoping is needed
/// (absent, empty or `.`). Fails when the cleaned path is absolute or
/// climbs above the repository root. Does no I/O, so it can run before
/// anything is fetched.
pub fn check_subdirectory(directory: Option<&str>, repository: &str) -> Result<Option<String>> {
    let Some(directory) = directory.filter(|d| !d.is_empty()) else {
        return Ok(None);
    };

    let cleaned = path::clean(directory);
    if path::escapes_root(&cleaned) {
        return Err(validation::subdirectory_invalid(
            directory,
            repository,
            ESCAPE_REASON,
        ));
    }
    if cleaned == "." {
        return Ok(None);
    }
    Ok(Some(cleaned))
}

/// Restrict `root` to `directory`.
///
/// An absent or empty directory returns `root` unchanged. The directory
/// must exist and be a directory; every error names both the requested
/// directory and the repository.
pub fn scope(
    root: Arc<dyn Storage>,
    directory: Option<&str>,
    repository: &str,
) -> Result<Arc<dyn Storage>> {
    let Some(cleaned) = check_subdirectory(directory, repository)? else {
        return Ok(root);
    };
    let requested = directory.unwrap_or_default();

    match root.stat(&cleaned) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(validation::subdirectory_invalid(
                requested,
                repository,
                "not a directory",
            ));
        }
        Err(e) => {
            return Err(validation::subdirectory_invalid(
                requested,
                repository,
                e.to_string(),
            ));
        }
    }

    Ok(Arc::new(Subtree {
        inner: root,
        base: cleaned,
    }))
}
