//! Building an in-memory working tree from a commit

use git2::{Commit, ObjectType, Repository, Tree};
use tracing::{debug, warn};

use crate::error::Result;
use crate::fs::MemoryTree;
use crate::fs::path;
use crate::fs::storage::{MODE_FILE, MODE_SYMLINK};

/// Copy every blob reachable from `commit`'s tree into a [`MemoryTree`].
///
/// Symlinks are stored as links (their target is the blob content) and
/// never followed. Submodule entries are skipped.
pub fn materialize(repo: &Repository, commit: &Commit<'_>) -> Result<MemoryTree> {
    let mut tree = MemoryTree::new();
    copy_tree(repo, &commit.tree()?, ".", &mut tree)?;
    debug!(files = tree.file_count(), commit = %commit.id(), "materialized working tree");
    Ok(tree)
}

fn copy_tree(repo: &Repository, source: &Tree<'_>, prefix: &str, out: &mut MemoryTree) -> Result<()> {
    for entry in source.iter() {
        let Some(name) = entry.name() else {
            warn!(prefix, "skipping entry with non UTF-8 name");
            continue;
        };
        let entry_path = path::join(prefix, name);
        match entry.kind() {
            Some(ObjectType::Tree) => {
                out.insert_dir(&entry_path)?;
                copy_tree(repo, &repo.find_tree(entry.id())?, &entry_path, out)?;
            }
            Some(ObjectType::Blob) => {
                let blob = repo.find_blob(entry.id())?;
                let mode = u32::try_from(entry.filemode()).unwrap_or(MODE_FILE);
                if mode == MODE_SYMLINK {
                    out.insert_symlink(&entry_path, blob.content())?;
                } else {
                    out.insert_file(&entry_path, blob.content(), mode)?;
                }
            }
            Some(ObjectType::Commit) => {
                warn!(path = %entry_path, "skipping submodule");
            }
            other => {
                debug!(path = %entry_path, kind = ?other, "skipping tree entry");
            }
        }
    }
    Ok(())
}
