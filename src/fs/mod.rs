//! Read-only filesystem view over fetched bundle content
//!
//! This module handles:
//! - The [`FilesystemView`] capability set (stat, open, read, list)
//! - [`BundleFs`], which adapts any [`Storage`] to that capability set
//! - In-memory working trees ([`MemoryTree`]) and subtree scoping
//!
//! View paths are slash-separated and relative to the bundle root, with
//! `.` naming the root itself. Paths containing `..`, `.` or empty
//! elements, or starting with `/`, are rejected with `InvalidPath`.

pub mod handle;
pub mod memory;
pub mod path;
pub mod scope;
pub mod storage;

use std::sync::Arc;

use crate::error::{Result, fs};

pub use handle::{DirHandle, FileHandle, Handle};
pub use memory::MemoryTree;
pub use scope::{Subtree, check_subdirectory, scope};
pub use storage::{DirEntry, FileKind, Metadata, Storage};

/// Read-only hierarchical namespace of files and directories
pub trait FilesystemView: Send + Sync {
    fn stat(&self, path: &str) -> Result<Metadata>;

    /// Open a file or directory
    fn open(&self, path: &str) -> Result<Handle>;

    /// Whole content of a file
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Entries of a directory, in storage order
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>>;
}

/// Adapter exposing a [`Storage`] as a [`FilesystemView`]
///
/// Cloning is cheap; clones share the underlying storage.
#[derive(Clone)]
pub struct BundleFs {
    storage: Arc<dyn Storage>,
}

impl BundleFs {
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    pub fn from_shared(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Every entry below `root`, depth first, parents before children
    pub fn walk(&self, root: &str) -> Result<Vec<(String, Metadata)>> {
        check_path("walk", root)?;
        let mut out = Vec::new();
        self.walk_into(root, &mut out)?;
        Ok(out)
    }

    fn walk_into(&self, dir: &str, out: &mut Vec<(String, Metadata)>) -> Result<()> {
        for meta in self.storage.read_dir(dir)? {
            let child = path::join(dir, meta.name());
            let is_dir = meta.is_dir();
            out.push((child.clone(), meta));
            if is_dir {
                self.walk_into(&child, out)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for BundleFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleFs").finish_non_exhaustive()
    }
}

fn check_path(op: &'static str, path: &str) -> Result<()> {
    if path::is_valid(path) {
        Ok(())
    } else {
        Err(fs::invalid_path(op, path))
    }
}

impl FilesystemView for BundleFs {
    fn stat(&self, path: &str) -> Result<Metadata> {
        check_path("stat", path)?;
        self.storage.stat(path)
    }

    fn open(&self, path: &str) -> Result<Handle> {
        check_path("open", path)?;
        let info = self.storage.stat(path)?;
        if info.is_dir() {
            let snapshot = self
                .storage
                .read_dir(path)?
                .into_iter()
                .map(DirEntry::from)
                .collect();
            return Ok(Handle::Dir(DirHandle::new(path, info, snapshot)));
        }
        let reader = self.storage.open_file(path)?;
        Ok(Handle::File(FileHandle::new(path, info, reader)))
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        match self.open(path)? {
            Handle::File(mut file) => {
                let content = file.read_to_end()?;
                file.close()?;
                Ok(content)
            }
            Handle::Dir(_) => Err(fs::is_a_directory("read", path)),
        }
    }

    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>> {
        check_path("readdir", path)?;
        Ok(self
            .storage
            .read_dir(path)?
            .into_iter()
            .map(DirEntry::from)
            .collect())
    }
}
