//! Descriptor validation
//!
//! Pure checks run before any fetch is attempted. The repository check
//! backs up admission-time validation done by whoever stores descriptors;
//! it is not the only place that enforces it.

use crate::error::{Result, UnpackError, validation};

use super::bundle::Bundle;
use super::bundle_source::SourceType;
use super::git_source::{GitRef, GitSource};

/// Validate a bundle whose source must be git, returning its git block.
///
/// Checks, in order: the source kind, presence of the git block, a
/// non-empty repository, then the ref.
pub fn validate_git(bundle: &Bundle) -> Result<&GitSource> {
    let source = bundle.source();
    if source.source_type != SourceType::Git {
        return Err(validation::unsupported_type(source.source_type.as_str()));
    }

    let git = source
        .git
        .as_ref()
        .ok_or_else(|| validation::configuration_unset(SourceType::Git.as_str()))?;

    if git.repository.trim().is_empty() {
        return Err(UnpackError::MissingRepository);
    }

    validate_ref(&git.git_ref)?;
    Ok(git)
}

fn validate_ref(git_ref: &GitRef) -> Result<()> {
    let set = git_ref.set_fields();
    if set.len() > 1 {
        return Err(validation::invalid_ref(format!(
            "only one of branch, tag or commit may be set, got {}",
            set.join(" and ")
        )));
    }

    for (field, value) in [
        ("branch", &git_ref.branch),
        ("tag", &git_ref.tag),
        ("commit", &git_ref.commit),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(validation::invalid_ref(format!("{field} is empty")));
        }
    }

    if let Some(commit) = git_ref.commit.as_deref() {
        let is_hex = commit.chars().all(|c| c.is_ascii_hexdigit());
        if !is_hex || !(4..=64).contains(&commit.len()) {
            return Err(validation::invalid_ref(format!(
                "commit \"{commit}\" is not a hexadecimal object id"
            )));
        }
    }

    Ok(())
}
