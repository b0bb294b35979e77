//! Bundle source handling
//!
//! This module describes where a bundle comes from and how it was pinned:
//! - `bundle.rs`: `Bundle` descriptor and YAML/JSON loading
//! - `bundle_source.rs`: `SourceType`, `BundleSource` and `ResolvedSource`
//! - `git_source.rs`: `GitSource`, `GitRef` and auth settings
//! - `validation.rs`: pure descriptor checks

pub mod bundle;
pub mod bundle_source;
pub mod git_source;
pub mod validation;

pub use bundle::{Bundle, BundleSpec};
pub use bundle_source::{BundleSource, ImageSource, ResolvedSource, SourceType};
pub use git_source::{GitAuth, GitRef, GitSource, RefSelector, SecretRef};
pub use validation::validate_git;
