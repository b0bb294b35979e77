//! Open file and directory handles
//!
//! A handle is either open or closed. Closing is idempotent and there is no
//! way back to open; every read or list on a closed handle fails with
//! `HandleClosed`.

use std::io::{self, Read};

use crate::error::{Result, fs};

use super::storage::{DirEntry, Metadata};

/// A handle returned by [`super::FilesystemView::open`]
#[derive(Debug)]
pub enum Handle {
    File(FileHandle),
    Dir(DirHandle),
}

impl Handle {
    pub fn path(&self) -> &str {
        match self {
            Handle::File(file) => &file.path,
            Handle::Dir(dir) => &dir.path,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Handle::Dir(_))
    }

    pub fn is_closed(&self) -> bool {
        match self {
            Handle::File(file) => file.is_closed(),
            Handle::Dir(dir) => dir.is_closed(),
        }
    }

    pub fn stat(&self) -> Result<Metadata> {
        match self {
            Handle::File(file) => file.stat(),
            Handle::Dir(dir) => dir.stat(),
        }
    }

    /// Read bytes. Fails with `IsADirectory` on a directory handle.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Handle::File(file) => file.read_into(buf),
            Handle::Dir(dir) => dir.read(buf),
        }
    }

    /// List directory entries. Fails with `NotADirectory` on a file handle.
    pub fn read_dir(&mut self, n: isize) -> Result<Vec<DirEntry>> {
        match self {
            Handle::File(file) => {
                if file.is_closed() {
                    Err(fs::handle_closed("readdir", &file.path))
                } else {
                    Err(fs::not_a_directory("readdir", &file.path))
                }
            }
            Handle::Dir(dir) => dir.read_dir(n),
        }
    }

    pub fn close(&mut self) -> Result<()> {
        match self {
            Handle::File(file) => file.close(),
            Handle::Dir(dir) => dir.close(),
        }
    }

    pub fn into_file(self) -> Option<FileHandle> {
        match self {
            Handle::File(file) => Some(file),
            Handle::Dir(_) => None,
        }
    }

    pub fn into_dir(self) -> Option<DirHandle> {
        match self {
            Handle::File(_) => None,
            Handle::Dir(dir) => Some(dir),
        }
    }
}

/// Handle to a file's content
pub struct FileHandle {
    path: String,
    info: Metadata,
    reader: Option<Box<dyn Read + Send>>,
}

impl FileHandle {
    pub(crate) fn new(path: impl Into<String>, info: Metadata, reader: Box<dyn Read + Send>) -> Self {
        Self {
            path: path.into(),
            info,
            reader: Some(reader),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    pub fn stat(&self) -> Result<Metadata> {
        if self.is_closed() {
            return Err(fs::handle_closed("stat", &self.path));
        }
        Ok(self.info.clone())
    }

    /// Read the remaining content
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let path = self.path.clone();
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| fs::handle_closed("read", &path))?;
        let mut content = Vec::with_capacity(usize::try_from(self.info.size()).unwrap_or(0));
        reader
            .read_to_end(&mut content)
            .map_err(|e| fs::io_error(format!("read {path}: {e}")))?;
        Ok(content)
    }

    pub fn close(&mut self) -> Result<()> {
        self.reader = None;
        Ok(())
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        let path = &self.path;
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| fs::handle_closed("read", path))?;
        reader
            .read(buf)
            .map_err(|e| fs::io_error(format!("read {path}: {e}")))
    }
}

impl std::fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileHandle")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_into(buf).map_err(io::Error::other)
    }
}

/// Handle to a directory
///
/// Listing reads from a snapshot taken when the handle was opened, so
/// repeated bounded calls return the same entries.
#[derive(Debug)]
pub struct DirHandle {
    path: String,
    info: Metadata,
    snapshot: Vec<DirEntry>,
    closed: bool,
}

impl DirHandle {
    pub(crate) fn new(path: impl Into<String>, info: Metadata, snapshot: Vec<DirEntry>) -> Self {
        Self {
            path: path.into(),
            info,
            snapshot,
            closed: false,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn stat(&self) -> Result<Metadata> {
        if self.closed {
            return Err(fs::handle_closed("stat", &self.path));
        }
        Ok(self.info.clone())
    }

    /// Up to `n` entries, or all of them when `n <= 0`
    pub fn read_dir(&self, n: isize) -> Result<Vec<DirEntry>> {
        if self.closed {
            return Err(fs::handle_closed("readdir", &self.path));
        }
        let len = self.snapshot.len();
        let take = usize::try_from(n).ok().filter(|&n| n > 0).map_or(len, |n| n.min(len));
        Ok(self.snapshot[..take].to_vec())
    }

    /// Directories have no byte content
    pub fn read(&self, _buf: &mut [u8]) -> Result<usize> {
        if self.closed {
            return Err(fs::handle_closed("read", &self.path));
        }
        Err(fs::is_a_directory("read", &self.path))
    }

    pub fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnpackError;
    use crate::fs::storage::{FileKind, MODE_DIR, MODE_FILE};
    use std::io::Cursor;

    fn file_handle(content: &'static str) -> FileHandle {
        let info = Metadata::new("f.txt", FileKind::File, content.len() as u64, MODE_FILE);
        FileHandle::new("f.txt", info, Box::new(Cursor::new(content.as_bytes())))
    }

    fn dir_handle(names: &[&str]) -> DirHandle {
        let entries = names
            .iter()
            .map(|n| Metadata::new(*n, FileKind::File, 0, MODE_FILE).into())
            .collect();
        DirHandle::new("d", Metadata::new("d", FileKind::Dir, 0, MODE_DIR), entries)
    }

    #[test]
    fn test_file_read_and_close() {
        let mut handle = file_handle("hello");
        assert_eq!(handle.read_to_end().unwrap(), b"hello");
        handle.close().unwrap();
        assert!(handle.is_closed());
        assert!(matches!(
            handle.read_to_end(),
            Err(UnpackError::HandleClosed { .. })
        ));
        assert!(matches!(handle.stat(), Err(UnpackError::HandleClosed { .. })));
    }

    #[test]
    fn test_file_implements_read() {
        let mut handle = file_handle("streamed");
        let mut out = String::new();
        handle.read_to_string(&mut out).unwrap();
        assert_eq!(out, "streamed");
    }

    #[test]
    fn test_dir_bounded_listing_is_repeatable() {
        let dir = dir_handle(&["a", "b", "c"]);
        let first = dir.read_dir(2).unwrap();
        let second = dir.read_dir(2).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(dir.read_dir(0).unwrap().len(), 3);
        assert_eq!(dir.read_dir(-1).unwrap().len(), 3);
        assert_eq!(dir.read_dir(10).unwrap().len(), 3);
    }

    #[test]
    fn test_dir_read_bytes_is_a_directory() {
        let mut handle = Handle::Dir(dir_handle(&[]));
        let mut buf = [0u8; 8];
        let err = handle.read(&mut buf).unwrap_err();
        assert!(matches!(err, UnpackError::IsADirectory { .. }));
        assert!(err.to_string().contains("is a directory"));
    }

    #[test]
    fn test_close_twice_succeeds() {
        let mut dir = Handle::Dir(dir_handle(&["a"]));
        assert!(dir.close().is_ok());
        assert!(dir.close().is_ok());

        let mut file = Handle::File(file_handle("x"));
        assert!(file.close().is_ok());
        assert!(file.close().is_ok());
    }

    #[test]
    fn test_closed_dir_rejects_listing() {
        let mut handle = Handle::Dir(dir_handle(&["a"]));
        handle.close().unwrap();
        assert!(matches!(
            handle.read_dir(0),
            Err(UnpackError::HandleClosed { .. })
        ));
        let mut buf = [0u8; 1];
        assert!(matches!(
            handle.read(&mut buf),
            Err(UnpackError::HandleClosed { .. })
        ));
    }

    #[test]
    fn test_file_handle_read_dir_not_a_directory() {
        let mut handle = Handle::File(file_handle("x"));
        assert!(matches!(
            handle.read_dir(0),
            Err(UnpackError::NotADirectory { .. })
        ));
    }
}
