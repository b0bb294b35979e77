//! Bundle descriptors
//!
//! A `Bundle` names a unit of content and says where to fetch it from.
//! Descriptors are usually written as YAML:
//!
//! ```yaml
//! name: my-operator
//! spec:
//!   source:
//!     type: git
//!     git:
//!       repository: https://github.com/example/bundles.git
//!       ref:
//!         tag: v0.3.0
//!       directory: manifests
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UnpackError};

use super::bundle_source::BundleSource;
use super::git_source::GitSource;

/// A named bundle and its source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub name: String,
    pub spec: BundleSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSpec {
    pub source: BundleSource,
}

impl Bundle {
    pub fn new(name: impl Into<String>, source: BundleSource) -> Self {
        Self {
            name: name.into(),
            spec: BundleSpec { source },
        }
    }

    /// A bundle fetched from git
    pub fn from_git(name: impl Into<String>, source: GitSource) -> Self {
        Self::new(name, BundleSource::git(source))
    }

    pub fn source(&self) -> &BundleSource {
        &self.spec.source
    }

    /// Parse a descriptor from YAML
    pub fn from_yaml_str(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Parse a descriptor from JSON
    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a descriptor file; `.json` files are parsed as JSON, anything
    /// else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| UnpackError::ConfigReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|reason| UnpackError::ConfigParseFailed {
            path: path.display().to_string(),
            reason,
        })
    }
}
