//! Remote URL handling for fetches
//!
//! libgit2 is stricter than the git CLI about URL shapes, so descriptors
//! written for the CLI are normalized before a remote is created:
//! - SCP-style `git@host:path` becomes `ssh://git@host/path`
//! - `file://relative` and backslash paths become `file:///...`

use std::borrow::Cow;
use std::path::Path;

/// Normalize a repository location for libgit2
pub fn normalize_remote_url(url: &str) -> Cow<'_, str> {
    let url = url.trim();
    if let Some(ssh) = scp_to_ssh(url) {
        return Cow::Owned(ssh);
    }
    if let Some(rest) = url.strip_prefix("file://") {
        if !rest.starts_with('/') {
            return Cow::Owned(format!("file:///{}", rest.replace('\\', "/")));
        }
        if rest.contains('\\') {
            return Cow::Owned(format!("file://{}", rest.replace('\\', "/")));
        }
    }
    Cow::Borrowed(url)
}

/// True for remotes on the local filesystem.
///
/// Anything that is neither `scheme://...` nor SCP-style `host:path` is a
/// path, relative ones included. libgit2's local transport cannot do
/// depth-limited fetches, so these are always fetched with full history.
pub fn is_local_url(url: &str) -> bool {
    let url = url.trim();
    if url.starts_with("file://") || Path::new(url).is_absolute() {
        return true;
    }
    !url.contains("://") && !is_scp_like(url)
}

/// `host:path` or `user@host:path`: a colon before the first slash
fn is_scp_like(url: &str) -> bool {
    match url.find(':') {
        Some(colon) => !url[..colon].contains('/'),
        None => false,
    }
}

fn scp_to_ssh(url: &str) -> Option<String> {
    if url.contains("://") || !url.starts_with("git@") {
        return None;
    }
    let (host, path) = url.split_once(':')?;
    let path = path.trim_start_matches('/');
    Some(format!("ssh://{host}/{path}"))
}
