//! Git source handling
//!
//! This module provides the `GitSource` descriptor and the `GitRef`
//! selector that decides how a repository is fetched.

use serde::{Deserialize, Serialize};

/// Git repository source details
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSource {
    /// Repository URL (HTTPS, SSH or file://)
    #[serde(default)]
    pub repository: String,

    /// Revision to fetch; empty means the remote default branch
    #[serde(rename = "ref", default, skip_serializing_if = "GitRef::is_empty")]
    pub git_ref: GitRef,

    /// Subdirectory within the repository that holds the bundle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    /// Authentication settings
    #[serde(default, skip_serializing_if = "GitAuth::is_default")]
    pub auth: GitAuth,
}

impl GitSource {
    /// Create a new git source tracking the default branch
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            ..Self::default()
        }
    }

    /// Track a branch
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.git_ref = GitRef::branch(branch);
        self
    }

    /// Track a tag
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.git_ref = GitRef::tag(tag);
        self
    }

    /// Pin a commit
    #[must_use]
    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.git_ref = GitRef::commit(commit);
        self
    }

    /// Set subdirectory
    #[must_use]
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    /// Disable TLS certificate verification
    #[must_use]
    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.auth.insecure_skip_verify = skip;
        self
    }

    /// Subdirectory, treating an empty string as unset
    pub fn subdirectory(&self) -> Option<&str> {
        self.directory.as_deref().filter(|d| !d.is_empty())
    }
}

/// Git ref: at most one of branch, tag or commit
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

impl GitRef {
    pub fn branch(name: impl Into<String>) -> Self {
        Self {
            branch: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            tag: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn commit(sha: impl Into<String>) -> Self {
        Self {
            commit: Some(sha.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.branch.is_none() && self.tag.is_none() && self.commit.is_none()
    }

    /// Names of the fields that are set, in declaration order
    pub fn set_fields(&self) -> Vec<&'static str> {
        [
            ("branch", self.branch.is_some()),
            ("tag", self.tag.is_some()),
            ("commit", self.commit.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    /// The selector this ref describes.
    ///
    /// Assumes the ref has been validated; when several fields are set the
    /// branch wins over the tag, and the tag over the commit.
    pub fn selector(&self) -> RefSelector<'_> {
        if let Some(branch) = self.branch.as_deref() {
            RefSelector::Branch(branch)
        } else if let Some(tag) = self.tag.as_deref() {
            RefSelector::Tag(tag)
        } else if let Some(commit) = self.commit.as_deref() {
            RefSelector::Commit(commit)
        } else {
            RefSelector::Default
        }
    }
}

/// The single revision a validated `GitRef` asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefSelector<'a> {
    Branch(&'a str),
    Tag(&'a str),
    Commit(&'a str),
    /// The remote's default branch
    Default,
}

/// Git authentication settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitAuth {
    /// Reference to a secret holding credentials (not supported, see DESIGN.md)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretRef>,

    /// Skip TLS certificate verification for HTTPS remotes
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

impl GitAuth {
    pub fn is_default(&self) -> bool {
        self == &Self::default()
    }

    /// Name of the referenced secret, if one is set and non-empty
    pub fn secret_name(&self) -> Option<&str> {
        self.secret
            .as_ref()
            .map(|s| s.name.as_str())
            .filter(|n| !n.is_empty())
    }
}

/// Reference to a named secret
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SecretRef {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector() {
        assert_eq!(GitRef::default().selector(), RefSelector::Default);
        assert_eq!(GitRef::branch("main").selector(), RefSelector::Branch("main"));
        assert_eq!(GitRef::tag("v1.0.0").selector(), RefSelector::Tag("v1.0.0"));
        assert_eq!(
            GitRef::commit("abc123").selector(),
            RefSelector::Commit("abc123")
        );
    }

    #[test]
    fn test_set_fields() {
        let git_ref = GitRef {
            branch: Some("main".to_string()),
            tag: None,
            commit: Some("abc".to_string()),
        };
        assert_eq!(git_ref.set_fields(), vec!["branch", "commit"]);
        assert!(GitRef::default().set_fields().is_empty());
    }

    #[test]
    fn test_serialize_skips_empty_fields() {
        let source = GitSource::new("https://example/repo.git").with_branch("main");
        let yaml = serde_yaml::to_string(&source).unwrap();
        assert!(yaml.contains("repository: https://example/repo.git"));
        assert!(yaml.contains("branch: main"));
        assert!(!yaml.contains("tag"));
        assert!(!yaml.contains("auth"));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let yaml = r"
repository: https://example/repo.git
ref:
  tag: v1.2.3
directory: manifests
auth:
  insecureSkipVerify: true
";
        let source: GitSource = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(source.git_ref.selector(), RefSelector::Tag("v1.2.3"));
        assert_eq!(source.subdirectory(), Some("manifests"));
        assert!(source.auth.insecure_skip_verify);
        assert_eq!(source.auth.secret_name(), None);
    }

    #[test]
    fn test_empty_directory_is_unset() {
        let source = GitSource::new("u").with_directory("");
        assert_eq!(source.subdirectory(), None);
    }
}
