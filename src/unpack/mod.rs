//! Bundle unpacking
//!
//! This module handles:
//! - The [`Fetch`] contract shared by source-kind fetchers
//! - [`GitUnpacker`], the git implementation
//! - [`Unpacker`], which dispatches on the descriptor's source kind
//!
//! A successful unpack yields a [`FetchResult`]: a read-only view of the
//! bundle content plus the source descriptor pinned to the exact commit
//! that was fetched.

pub mod config;
pub mod git;

use crate::context::Context;
use crate::error::{Result, validation};
use crate::fs::BundleFs;
use crate::source::{Bundle, ResolvedSource, SourceType};

pub use config::GitUnpackerConfig;
pub use git::GitUnpacker;

/// Outcome of a successful unpack
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Content view, scoped to the requested subdirectory
    pub bundle: BundleFs,
    /// The input descriptor with its ref replaced by the fetched commit
    pub resolved_source: ResolvedSource,
}

/// Retrieves bundle content for one kind of source
pub trait Fetch: Send + Sync {
    /// Pure descriptor checks; no I/O
    fn validate(&self, bundle: &Bundle) -> Result<()>;

    /// Validate, fetch and check out the bundle's source
    fn unpack(&self, ctx: &Context, bundle: &Bundle) -> Result<FetchResult>;
}

/// Fetcher for any supported source kind
#[derive(Debug, Clone, Default)]
pub struct Unpacker {
    git: GitUnpacker,
}

impl Unpacker {
    pub fn new(git: GitUnpacker) -> Self {
        Self { git }
    }

    fn fetcher(&self, bundle: &Bundle) -> Result<&dyn Fetch> {
        match bundle.source().source_type {
            SourceType::Git => Ok(&self.git),
            kind @ (SourceType::Image | SourceType::Upload) => {
                Err(validation::unsupported_type(kind.as_str()))
            }
        }
    }
}

impl Fetch for Unpacker {
    fn validate(&self, bundle: &Bundle) -> Result<()> {
        self.fetcher(bundle)?.validate(bundle)
    }

    fn unpack(&self, ctx: &Context, bundle: &Bundle) -> Result<FetchResult> {
        self.fetcher(bundle)?.unpack(ctx, bundle)
    }
}
