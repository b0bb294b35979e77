//! Git transport for bundle sources
//!
//! This module handles:
//! - Fetching one revision of a remote into a scratch bare repository
//! - Detaching HEAD at a requested commit and resolving it back
//! - Building an in-memory working tree from the pinned commit
//!
//! Authentication is delegated to git's native credential system:
//! - SSH keys from ~/.ssh/ and the SSH agent
//! - Git credential helpers

pub mod auth;
pub mod checkout;
pub mod error;
pub mod fetch;
pub mod url;
pub mod worktree;

pub use checkout::{checkout_commit, detach_head, resolve_head};
pub use error::interpret_git_error;
pub use fetch::{FetchRequest, FetchStrategy, fetch};
pub use url::{is_local_url, normalize_remote_url};
pub use worktree::materialize;
