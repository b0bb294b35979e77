//! Fetching a single revision into a scratch repository
//!
//! Objects are fetched into a bare repository; nothing is checked out on
//! disk. What gets fetched depends on the requested ref:
//!
//! | ref     | refspec                         | depth |
//! |---------|---------------------------------|-------|
//! | branch  | `refs/heads/<b>` only           | 1     |
//! | tag     | `refs/tags/<t>` only            | 1     |
//! | commit  | every `refs/heads/*`            | full  |
//! | none    | the remote's default branch     | full  |
//!
//! Tags are never followed automatically. Depth is only applied to remote
//! transports; libgit2 cannot fetch shallowly from a local path.

use std::cell::RefCell;

use git2::{AutotagOption, Direction, FetchOptions, Oid, Remote, RemoteCallbacks, Repository};
use tracing::{debug, instrument};

use super::auth::configure_callbacks;
use super::error::interpret_git_error;
use super::url::{is_local_url, normalize_remote_url};
use crate::context::Context;
use crate::error::{Result, UnpackError, git};
use crate::source::RefSelector;

const REMOTE_PREFIX: &str = "refs/remotes/origin/";

/// What to fetch for a requested ref
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStrategy {
    Branch(String),
    Tag(String),
    /// Full history of every branch, so any reachable commit can be found
    AllHeads,
    DefaultBranch,
}

impl From<RefSelector<'_>> for FetchStrategy {
    fn from(selector: RefSelector<'_>) -> Self {
        match selector {
            RefSelector::Branch(b) => FetchStrategy::Branch(b.to_string()),
            RefSelector::Tag(t) => FetchStrategy::Tag(t.to_string()),
            RefSelector::Commit(_) => FetchStrategy::AllHeads,
            RefSelector::Default => FetchStrategy::DefaultBranch,
        }
    }
}

impl FetchStrategy {
    /// Whether a depth-1 fetch is enough for this strategy
    pub fn allows_shallow(&self) -> bool {
        matches!(self, FetchStrategy::Branch(_) | FetchStrategy::Tag(_))
    }

    /// Refspecs to fetch; `default_branch` is a full `refs/heads/...` name
    fn refspecs(&self, default_branch: Option<&str>) -> Vec<String> {
        match self {
            FetchStrategy::Branch(b) => vec![format!("+refs/heads/{b}:{REMOTE_PREFIX}{b}")],
            FetchStrategy::Tag(t) => vec![format!("+refs/tags/{t}:refs/tags/{t}")],
            FetchStrategy::AllHeads => vec![format!("+refs/heads/*:{REMOTE_PREFIX}*")],
            FetchStrategy::DefaultBranch => default_branch
                .and_then(|full| full.strip_prefix("refs/heads/"))
                .map(|b| vec![format!("+refs/heads/{b}:{REMOTE_PREFIX}{b}")])
                .unwrap_or_default(),
        }
    }

    /// Local ref holding the fetched tip, if the strategy has a single one
    fn local_ref(&self, default_branch: Option<&str>) -> Option<(String, String)> {
        match self {
            FetchStrategy::Branch(b) => Some((b.clone(), format!("{REMOTE_PREFIX}{b}"))),
            FetchStrategy::Tag(t) => Some((t.clone(), format!("refs/tags/{t}"))),
            FetchStrategy::AllHeads => None,
            FetchStrategy::DefaultBranch => {
                let name = default_branch?.strip_prefix("refs/heads/")?;
                Some((name.to_string(), format!("{REMOTE_PREFIX}{name}")))
            }
        }
    }
}

/// Options for one fetch
#[derive(Debug, Clone)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    pub strategy: FetchStrategy,
    /// Allow depth-1 fetches where the strategy permits them
    pub shallow: bool,
    pub insecure_skip_verify: bool,
}

impl FetchRequest<'_> {
    fn depth(&self) -> Option<i32> {
        (self.shallow && self.strategy.allows_shallow() && !is_local_url(self.url)).then_some(1)
    }
}

/// Fetch the requested revision into `repo`.
///
/// Returns the tip commit for branch, tag and default-branch strategies,
/// or `None` for [`FetchStrategy::AllHeads`]. Transport errors carry the
/// sideband transcript; a cancelled context yields `Cancelled` instead.
#[instrument(skip_all, fields(url = request.url, strategy = ?request.strategy))]
pub fn fetch(ctx: &Context, repo: &Repository, request: &FetchRequest<'_>) -> Result<Option<Oid>> {
    check_cancelled(ctx, request.url)?;

    let remote_url = normalize_remote_url(request.url);
    let mut remote = repo
        .remote_anonymous(&remote_url)
        .map_err(|e| git::clone_failed(request.url, interpret_git_error(&e), ""))?;

    let progress = RefCell::new(Vec::new());

    let default_branch = match request.strategy {
        FetchStrategy::DefaultBranch => {
            Some(discover_default_branch(ctx, &mut remote, request, &progress)?)
        }
        _ => None,
    };

    let refspecs = request.strategy.refspecs(default_branch.as_deref());
    let depth = request.depth();
    debug!(?refspecs, ?depth, "fetching");

    let mut options = FetchOptions::new();
    options
        .remote_callbacks(callbacks(ctx, &progress, request.insecure_skip_verify))
        .download_tags(AutotagOption::None);
    if let Some(depth) = depth {
        options.depth(depth);
    }

    if let Err(e) = remote.fetch(&refspecs, Some(&mut options), None) {
        return Err(transport_error(ctx, request.url, &e, &progress));
    }
    check_cancelled(ctx, request.url)?;

    let stats = remote.stats();
    debug!(
        objects = stats.received_objects(),
        bytes = stats.received_bytes(),
        "fetch complete"
    );

    let Some((name, local)) = request.strategy.local_ref(default_branch.as_deref()) else {
        return Ok(None);
    };
    let commit = repo
        .find_reference(&local)
        .and_then(|r| r.peel_to_commit())
        .map_err(|e| git::ref_resolve_failed(name, e.message()))?;
    Ok(Some(commit.id()))
}

fn discover_default_branch(
    ctx: &Context,
    remote: &mut Remote<'_>,
    request: &FetchRequest<'_>,
    progress: &RefCell<Vec<u8>>,
) -> Result<String> {
    let connection = remote
        .connect_auth(
            Direction::Fetch,
            Some(callbacks(ctx, progress, request.insecure_skip_verify)),
            None,
        )
        .map_err(|e| transport_error(ctx, request.url, &e, progress))?;
    let branch = connection
        .default_branch()
        .map_err(|e| git::ref_resolve_failed("HEAD", e.message()))?;
    let branch = branch
        .as_str()
        .ok_or_else(|| git::ref_resolve_failed("HEAD", "default branch name is not UTF-8"))?
        .to_string();
    if !branch.starts_with("refs/heads/") {
        return Err(git::ref_resolve_failed(
            "HEAD",
            format!("remote HEAD points at {branch}, not a branch"),
        ));
    }
    debug!(%branch, "discovered default branch");
    Ok(branch)
}

fn callbacks<'a>(
    ctx: &'a Context,
    progress: &'a RefCell<Vec<u8>>,
    insecure_skip_verify: bool,
) -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    configure_callbacks(&mut callbacks, insecure_skip_verify);
    callbacks.sideband_progress(move |data| {
        progress.borrow_mut().extend_from_slice(data);
        on_progress();
        !ctx.is_done()
    });
    callbacks.transfer_progress(move |_| {
        on_progress();
        !ctx.is_done()
    });
    callbacks
}

#[cfg(not(test))]
fn on_progress() {}

#[cfg(test)]
thread_local! {
    static PROGRESS_HOOK: RefCell<Option<Box<dyn Fn()>>> = const { RefCell::new(None) };
}

/// Runs the installed hook; libgit2 calls back on the fetching thread
#[cfg(test)]
fn on_progress() {
    PROGRESS_HOOK.with(|hook| {
        if let Some(hook) = hook.borrow().as_ref() {
            hook();
        }
    });
}

fn check_cancelled(ctx: &Context, url: &str) -> Result<()> {
    match ctx.cancelled() {
        Some(reason) => Err(git::cancelled(url, reason.to_string())),
        None => Ok(()),
    }
}

fn transport_error(
    ctx: &Context,
    url: &str,
    err: &git2::Error,
    progress: &RefCell<Vec<u8>>,
) -> UnpackError {
    if let Some(reason) = ctx.cancelled() {
        return git::cancelled(url, reason.to_string());
    }
    let transcript = String::from_utf8_lossy(&progress.borrow()).into_owned();
    git::clone_failed(url, interpret_git_error(err), transcript)
}
