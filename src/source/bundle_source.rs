//! Bundle source handling
//!
//! This module provides the `BundleSource` descriptor, the closed set of
//! source kinds, and the pinned `ResolvedSource`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, git};

use super::git_source::{GitRef, GitSource};

/// Kind of a bundle source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Git,
    Image,
    Upload,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceType::Git => "git",
            SourceType::Image => "image",
            SourceType::Upload => "upload",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Container image source details
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    /// Image reference, e.g. `quay.io/org/bundle:v1`
    #[serde(rename = "ref", default)]
    pub image_ref: String,
}

/// Where a bundle's content comes from
///
/// The `type` field names the kind; the matching per-kind block carries
/// its configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSource {
    #[serde(rename = "type")]
    pub source_type: SourceType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSource>,
}

impl BundleSource {
    /// A git source
    pub fn git(source: GitSource) -> Self {
        Self {
            source_type: SourceType::Git,
            git: Some(source),
            image: None,
        }
    }

    /// An image source
    pub fn image(image_ref: impl Into<String>) -> Self {
        Self {
            source_type: SourceType::Image,
            git: None,
            image: Some(ImageSource {
                image_ref: image_ref.into(),
            }),
        }
    }

    /// Check if this is a git source
    pub fn is_git(&self) -> bool {
        self.source_type == SourceType::Git
    }
}

/// A bundle source pinned to an immutable revision
///
/// For git sources the ref is always `{commit: <full hex id>}`; branch and
/// tag names never survive resolution. Fetching a `ResolvedSource` again
/// yields the same content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedSource(BundleSource);

impl ResolvedSource {
    /// Pin a git source to `commit`, keeping every other field.
    ///
    /// `commit` must be a full hexadecimal object id (40 or 64 chars).
    pub fn pin(source: &GitSource, commit: &str) -> Result<Self> {
        if !is_full_object_id(commit) {
            return Err(git::ref_resolve_failed(
                commit,
                "resolved revision is not a full object id",
            ));
        }
        let mut pinned = source.clone();
        pinned.git_ref = GitRef::commit(commit.to_ascii_lowercase());
        Ok(Self(BundleSource::git(pinned)))
    }

    /// The pinned commit id
    pub fn commit(&self) -> &str {
        self.0
            .git
            .as_ref()
            .and_then(|g| g.git_ref.commit.as_deref())
            .unwrap_or_default()
    }

    pub fn source(&self) -> &BundleSource {
        &self.0
    }

    pub fn into_inner(self) -> BundleSource {
        self.0
    }
}

impl AsRef<BundleSource> for ResolvedSource {
    fn as_ref(&self) -> &BundleSource {
        &self.0
    }
}

fn is_full_object_id(id: &str) -> bool {
    matches!(id.len(), 40 | 64) && id.chars().all(|c| c.is_ascii_hexdigit())
}
