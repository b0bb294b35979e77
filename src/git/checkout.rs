//! Pointing HEAD at a revision and reading it back
//!
//! The scratch repository is bare, so "checking out" only moves HEAD; the
//! working tree is built in memory by [`super::worktree`].

use git2::{Commit, Oid, Repository};

use crate::error::{Result, git};

/// Detach HEAD at `sha`.
///
/// Full ids are looked up directly; abbreviated ids go through revparse
/// and must be unambiguous. Any failure names the requested commit.
pub fn checkout_commit(repo: &Repository, sha: &str) -> Result<Oid> {
    let commit = find_commit(repo, sha).map_err(|e| git::checkout_failed(sha, e.message()))?;
    repo.set_head_detached(commit.id())
        .map_err(|e| git::checkout_failed(sha, e.message()))?;
    Ok(commit.id())
}

/// Detach HEAD at a commit already known to exist
pub fn detach_head(repo: &Repository, oid: Oid) -> Result<()> {
    repo.set_head_detached(oid)
        .map_err(|e| git::checkout_failed(oid.to_string(), e.message()))
}

/// Commit HEAD points at, peeling tags
pub fn resolve_head(repo: &Repository) -> Result<Commit<'_>> {
    repo.head()
        .and_then(|head| head.peel_to_commit())
        .map_err(|e| git::ref_resolve_failed("HEAD", e.message()))
}

fn find_commit<'r>(repo: &'r Repository, sha: &str) -> std::result::Result<Commit<'r>, git2::Error> {
    if matches!(sha.len(), 40 | 64) {
        return repo.find_commit(Oid::from_str(sha)?);
    }
    repo.revparse_single(&format!("{sha}^{{commit}}"))?.peel_to_commit()
}
