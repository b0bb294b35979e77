//! Raw hierarchical storage behind the filesystem view

use std::io::Read;
use std::sync::Arc;

use crate::error::Result;

/// Git tree entry mode of a directory
pub const MODE_DIR: u32 = 0o040_000;
/// Git tree entry mode of a regular file
pub const MODE_FILE: u32 = 0o100_644;
/// Git tree entry mode of an executable file
pub const MODE_EXECUTABLE: u32 = 0o100_755;
/// Git tree entry mode of a symbolic link
pub const MODE_SYMLINK: u32 = 0o120_000;

/// Type of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    File,
    Dir,
    /// A symbolic link. Its content is the link target; it is never followed.
    Symlink,
}

/// Stat information for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    name: String,
    kind: FileKind,
    size: u64,
    mode: u32,
}

impl Metadata {
    pub fn new(name: impl Into<String>, kind: FileKind, size: u64, mode: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
            mode,
        }
    }

    /// Base name of the entry (`.` for a root)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    /// Length in bytes; 0 for directories
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Git tree entry mode
    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn is_executable(&self) -> bool {
        self.mode == MODE_EXECUTABLE
    }
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    info: Metadata,
}

impl DirEntry {
    pub fn name(&self) -> &str {
        self.info.name()
    }

    pub fn kind(&self) -> FileKind {
        self.info.kind()
    }

    pub fn is_dir(&self) -> bool {
        self.info.is_dir()
    }

    /// Stat information for the entry
    pub fn info(&self) -> Result<Metadata> {
        Ok(self.info.clone())
    }
}

impl From<Metadata> for DirEntry {
    fn from(info: Metadata) -> Self {
        Self { info }
    }
}

/// Read-only hierarchical storage.
///
/// Paths passed in are valid view paths (see [`super::path::is_valid`]);
/// implementations may assume that and need not re-validate.
pub trait Storage: Send + Sync {
    fn stat(&self, path: &str) -> Result<Metadata>;

    /// Entries of a directory, in storage order
    fn read_dir(&self, path: &str) -> Result<Vec<Metadata>>;

    /// Open a non-directory entry for reading
    fn open_file(&self, path: &str) -> Result<Box<dyn Read + Send>>;
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn stat(&self, path: &str) -> Result<Metadata> {
        (**self).stat(path)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<Metadata>> {
        (**self).read_dir(path)
    }

    fn open_file(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        (**self).open_file(path)
    }
}
