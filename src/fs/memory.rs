//! In-memory working tree
//!
//! `MemoryTree` holds a checked-out tree entirely in memory. File contents
//! are shared (`Arc<[u8]>`), so open handles stay valid and cheap to clone.
//! Directory entries are kept in byte-wise name order, the order git
//! stores tree entries in.

use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::sync::Arc;

use crate::error::{Result, fs};

use super::path;
use super::storage::{FileKind, MODE_DIR, MODE_SYMLINK, Metadata, Storage};

#[derive(Debug, Clone)]
enum Node {
    File { data: Arc<[u8]>, mode: u32 },
    Symlink { target: Arc<[u8]> },
    Dir(BTreeMap<String, Node>),
}

impl Node {
    fn metadata(&self, name: &str) -> Metadata {
        match self {
            Node::File { data, mode } => Metadata::new(name, FileKind::File, data.len() as u64, *mode),
            Node::Symlink { target } => {
                Metadata::new(name, FileKind::Symlink, target.len() as u64, MODE_SYMLINK)
            }
            Node::Dir(_) => Metadata::new(name, FileKind::Dir, 0, MODE_DIR),
        }
    }
}

/// A tree of files and directories held in memory
#[derive(Debug, Clone)]
pub struct MemoryTree {
    root: Node,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self {
            root: Node::Dir(BTreeMap::new()),
        }
    }
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a regular file, creating missing parent directories
    pub fn insert_file(&mut self, path: &str, data: impl Into<Vec<u8>>, mode: u32) -> Result<()> {
        let data: Vec<u8> = data.into();
        self.insert(path, Node::File { data: data.into(), mode })
    }

    /// Add a symbolic link pointing at `target`
    pub fn insert_symlink(&mut self, path: &str, target: impl Into<Vec<u8>>) -> Result<()> {
        let target: Vec<u8> = target.into();
        self.insert(path, Node::Symlink { target: target.into() })
    }

    /// Add a directory (and its parents); existing directories are kept
    pub fn insert_dir(&mut self, path: &str) -> Result<()> {
        if path == "." {
            return Ok(());
        }
        check(path, "mkdir")?;
        let children = self.parent_mut(path, "mkdir")?;
        let node = children
            .entry(path::base_name(path).to_string())
            .or_insert_with(|| Node::Dir(BTreeMap::new()));
        match node {
            Node::Dir(_) => Ok(()),
            _ => Err(fs::not_a_directory("mkdir", path)),
        }
    }

    /// Number of regular files and symlinks in the tree
    pub fn file_count(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node {
                Node::Dir(children) => children.values().map(count).sum(),
                _ => 1,
            }
        }
        count(&self.root)
    }

    fn insert(&mut self, path: &str, node: Node) -> Result<()> {
        check(path, "create")?;
        let children = self.parent_mut(path, "create")?;
        children.insert(path::base_name(path).to_string(), node);
        Ok(())
    }

    /// Children map of `path`'s parent, creating directories on the way
    fn parent_mut(&mut self, path: &str, op: &'static str) -> Result<&mut BTreeMap<String, Node>> {
        let Node::Dir(root) = &mut self.root else {
            return Err(fs::not_a_directory(op, "."));
        };
        let mut current = root;

        let mut parents: Vec<&str> = path.split('/').collect();
        parents.pop();
        for part in parents {
            let node = current
                .entry(part.to_string())
                .or_insert_with(|| Node::Dir(BTreeMap::new()));
            current = match node {
                Node::Dir(children) => children,
                _ => return Err(fs::not_a_directory(op, path)),
            };
        }
        Ok(current)
    }

    fn lookup(&self, path: &str) -> Option<&Node> {
        if path == "." {
            return Some(&self.root);
        }
        let mut node = &self.root;
        for part in path.split('/') {
            match node {
                Node::Dir(children) => node = children.get(part)?,
                _ => return None,
            }
        }
        Some(node)
    }
}

fn check(path: &str, op: &'static str) -> Result<()> {
    if path::is_valid(path) && path != "." {
        Ok(())
    } else {
        Err(fs::invalid_path(op, path))
    }
}

impl Storage for MemoryTree {
    fn stat(&self, path: &str) -> Result<Metadata> {
        self.lookup(path)
            .map(|node| node.metadata(path::base_name(path)))
            .ok_or_else(|| fs::not_found("stat", path))
    }

    fn read_dir(&self, path: &str) -> Result<Vec<Metadata>> {
        match self.lookup(path) {
            Some(Node::Dir(children)) => Ok(children
                .iter()
                .map(|(name, node)| node.metadata(name))
                .collect()),
            Some(_) => Err(fs::not_a_directory("readdir", path)),
            None => Err(fs::not_found("readdir", path)),
        }
    }

    fn open_file(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        match self.lookup(path) {
            Some(Node::File { data, .. }) => Ok(Box::new(Cursor::new(Arc::clone(data)))),
            Some(Node::Symlink { target }) => Ok(Box::new(Cursor::new(Arc::clone(target)))),
            Some(Node::Dir(_)) => Err(fs::is_a_directory("open", path)),
            None => Err(fs::not_found("open", path)),
        }
    }
}
