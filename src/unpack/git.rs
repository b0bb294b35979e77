//! Git-backed bundle unpacking

use std::sync::Arc;

use git2::Repository;
use tracing::{Span, debug, field, info, instrument, warn};

use super::config::GitUnpackerConfig;
use super::{Fetch, FetchResult};
use crate::context::Context;
use crate::error::{Result, UnpackError, fs as fs_error, git as git_error};
use crate::fs::{BundleFs, MemoryTree, check_subdirectory, scope};
use crate::git::{self, FetchRequest};
use crate::source::{Bundle, GitSource, RefSelector, ResolvedSource, validate_git};

/// Fetches git bundle sources.
///
/// Every call works in its own scratch repository, removed before the call
/// returns; the fetched tree lives only in the returned view.
///
/// The scratch repository is a bare repository on disk under
/// [`GitUnpackerConfig::temp_base`], because libgit2 writes fetched packs to
/// an on-disk object database. Only git objects land there, never a checked
/// out working tree.
#[derive(Debug, Clone, Default)]
pub struct GitUnpacker {
    config: GitUnpackerConfig,
}

impl GitUnpacker {
    pub fn new(config: GitUnpackerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GitUnpackerConfig {
        &self.config
    }

    /// Validate and return the git block
    fn checked_source<'b>(&self, bundle: &'b Bundle) -> Result<&'b GitSource> {
        let source = validate_git(bundle)?;
        if let Some(secret) = source.auth.secret_name() {
            return Err(UnpackError::AuthSecretUnsupported {
                secret: secret.to_string(),
            });
        }
        Ok(source)
    }

    /// Fetch, pin and materialize the requested revision
    fn fetch_tree(&self, ctx: &Context, source: &GitSource) -> Result<(MemoryTree, ResolvedSource)> {
        let scratch = tempfile::Builder::new()
            .prefix("bundle-unpack-")
            .tempdir_in(&self.config.temp_base)
            .map_err(|e| {
                fs_error::io_error(format!(
                    "create scratch repository in {}: {e}",
                    self.config.temp_base.display()
                ))
            })?;

        let result = {
            let repo = Repository::init_bare(scratch.path())?;
            let selector = source.git_ref.selector();
            let request = FetchRequest {
                url: &source.repository,
                strategy: selector.into(),
                shallow: self.config.shallow,
                insecure_skip_verify: source.auth.insecure_skip_verify,
            };
            if request.insecure_skip_verify {
                warn!("TLS certificate verification disabled for this source");
            }

            let tip = git::fetch(ctx, &repo, &request)?;
            match (selector, tip) {
                (RefSelector::Commit(sha), _) => {
                    git::checkout_commit(&repo, sha)?;
                }
                (_, Some(oid)) => git::detach_head(&repo, oid)?,
                (_, None) => {}
            }

            let commit = git::resolve_head(&repo)?;
            let resolved = ResolvedSource::pin(source, &commit.id().to_string())?;
            info!(commit = %commit.id(), "pinned bundle source");
            (git::materialize(&repo, &commit)?, resolved)
        };

        if let Err(e) = scratch.close() {
            warn!(error = %e, "failed to remove scratch repository");
        }
        Ok(result)
    }
}

impl Fetch for GitUnpacker {
    fn validate(&self, bundle: &Bundle) -> Result<()> {
        self.checked_source(bundle).map(|_| ())
    }

    #[instrument(skip_all, fields(bundle = %bundle.name, repository = field::Empty))]
    fn unpack(&self, ctx: &Context, bundle: &Bundle) -> Result<FetchResult> {
        let source = self.checked_source(bundle)?;
        Span::current().record("repository", source.repository.as_str());

        // Containment is decided lexically, before anything is fetched.
        check_subdirectory(source.subdirectory(), &source.repository)?;
        if let Some(reason) = ctx.cancelled() {
            return Err(git_error::cancelled(&source.repository, reason.to_string()));
        }
        debug!(selector = ?source.git_ref.selector(), "unpacking bundle");

        let (tree, resolved_source) = self.fetch_tree(ctx, source)?;
        let storage = scope(Arc::new(tree), source.subdirectory(), &source.repository)?;

        Ok(FetchResult {
            bundle: BundleFs::from_shared(storage),
            resolved_source,
        })
    }
}
