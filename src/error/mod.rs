//! Error types and handling for bundle unpacking
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`validation`]: Descriptor validation and containment errors
//! - [`git`]: Git transport, checkout and resolution errors
//! - [`fs`]: Filesystem view errors

pub mod fs;
pub mod git;
pub mod validation;

use miette::Diagnostic;
use thiserror::Error;

/// Broad category of an [`UnpackError`].
///
/// Callers use this to decide how to surface a failure (for example a
/// validation failure is a user error, a transport failure may be retried
/// by the caller).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing descriptor fields, detected before any fetch
    Validation,
    /// Network or clone failure
    Transport,
    /// The caller's cancellation signal fired
    Cancelled,
    /// The requested revision could not be realized
    Checkout,
    /// The subdirectory escapes or is missing from the fetch root
    Containment,
    /// HEAD could not be resolved to an immutable revision
    Resolution,
    /// The local scratch repository or its object store failed
    Repository,
    /// Filesystem view operation failed
    Filesystem,
    /// Descriptor or configuration file could not be loaded
    Config,
    /// A downstream Process or Apply collaborator failed
    Pipeline,
}

/// Main error type for bundle unpacking
#[derive(Error, Diagnostic, Debug)]
pub enum UnpackError {
    // Validation errors
    #[error("bundle source type \"{kind}\" not supported")]
    #[diagnostic(
        code(bundle_unpack::validation::unsupported_type),
        help("Only git bundle sources can be unpacked")
    )]
    UnsupportedSourceType { kind: String },

    #[error("bundle source {kind} configuration is unset")]
    #[diagnostic(code(bundle_unpack::validation::configuration_unset))]
    ConfigurationUnset { kind: String },

    #[error("missing git source information: repository must be provided")]
    #[diagnostic(code(bundle_unpack::validation::missing_repository))]
    MissingRepository,

    #[error("invalid git ref: {message}")]
    #[diagnostic(
        code(bundle_unpack::validation::invalid_ref),
        help("Set at most one of branch, tag or commit")
    )]
    InvalidRef { message: String },

    #[error("git auth secret '{secret}' cannot be used: secret-based authentication is not supported")]
    #[diagnostic(
        code(bundle_unpack::validation::auth_unsupported),
        help("Remove auth.secret; ambient git credentials (credential helpers, ssh agent) are used instead")
    )]
    AuthSecretUnsupported { secret: String },

    // Containment errors
    #[error("get subdirectory \"{directory}\" for repository \"{repository}\": {reason}")]
    #[diagnostic(code(bundle_unpack::containment::subdirectory))]
    SubdirectoryInvalid {
        directory: String,
        repository: String,
        reason: String,
    },

    // Git errors
    #[error("bundle unpack git clone error: {url}: {reason} - {progress}")]
    #[diagnostic(
        code(bundle_unpack::git::clone_failed),
        help("Check that URL is correct and you have access to repository")
    )]
    GitCloneFailed {
        url: String,
        reason: String,
        progress: String,
    },

    #[error("bundle unpack of {url} cancelled: {reason}")]
    #[diagnostic(code(bundle_unpack::git::cancelled))]
    Cancelled { url: String, reason: String },

    #[error("checkout commit \"{sha}\": {reason}")]
    #[diagnostic(
        code(bundle_unpack::git::checkout_failed),
        help("The commit must be reachable from a branch of the repository")
    )]
    GitCheckoutFailed { sha: String, reason: String },

    #[error("resolve commit hash for '{git_ref}': {reason}")]
    #[diagnostic(code(bundle_unpack::git::resolve_failed))]
    GitRefResolveFailed { git_ref: String, reason: String },

    #[error("Git operation failed: {message}")]
    #[diagnostic(
        code(bundle_unpack::git::operation_failed),
        help("The scratch repository could not be written or read; check free space and permissions of the temp directory")
    )]
    GitOperationFailed { message: String },

    // Filesystem errors
    #[error("{op} {path}: file does not exist")]
    #[diagnostic(code(bundle_unpack::fs::not_found))]
    NotFound { op: &'static str, path: String },

    #[error("{op} {path}: is a directory")]
    #[diagnostic(code(bundle_unpack::fs::is_a_directory))]
    IsADirectory { op: &'static str, path: String },

    #[error("{op} {path}: not a directory")]
    #[diagnostic(code(bundle_unpack::fs::not_a_directory))]
    NotADirectory { op: &'static str, path: String },

    #[error("{op} {path}: handle closed")]
    #[diagnostic(code(bundle_unpack::fs::handle_closed))]
    HandleClosed { op: &'static str, path: String },

    #[error("{op} {path}: invalid argument")]
    #[diagnostic(
        code(bundle_unpack::fs::invalid_path),
        help("Paths are slash-separated, relative to the bundle root, without '.' or '..' elements")
    )]
    InvalidPath { op: &'static str, path: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(bundle_unpack::fs::io_error))]
    IoError { message: String },

    // Configuration errors
    #[error("Failed to parse bundle descriptor: {path}: {reason}")]
    #[diagnostic(code(bundle_unpack::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Failed to read bundle descriptor: {path}: {reason}")]
    #[diagnostic(code(bundle_unpack::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    // Pipeline errors
    #[error("{stage} stage failed: {message}")]
    #[diagnostic(code(bundle_unpack::pipeline::stage_failed))]
    StageFailed { stage: &'static str, message: String },
}

impl UnpackError {
    /// Category of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedSourceType { .. }
            | Self::ConfigurationUnset { .. }
            | Self::MissingRepository
            | Self::InvalidRef { .. }
            | Self::AuthSecretUnsupported { .. } => ErrorKind::Validation,
            Self::SubdirectoryInvalid { .. } => ErrorKind::Containment,
            Self::GitCloneFailed { .. } => ErrorKind::Transport,
            Self::GitOperationFailed { .. } => ErrorKind::Repository,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::GitCheckoutFailed { .. } => ErrorKind::Checkout,
            Self::GitRefResolveFailed { .. } => ErrorKind::Resolution,
            Self::NotFound { .. }
            | Self::IsADirectory { .. }
            | Self::NotADirectory { .. }
            | Self::HandleClosed { .. }
            | Self::InvalidPath { .. }
            | Self::IoError { .. } => ErrorKind::Filesystem,
            Self::StageFailed { .. } => ErrorKind::Pipeline,
            Self::ConfigParseFailed { .. } | Self::ConfigReadFailed { .. } => ErrorKind::Config,
        }
    }

    /// True if the error was raised before any network traffic
    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

impl From<std::io::Error> for UnpackError {
    fn from(err: std::io::Error) -> Self {
        UnpackError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for UnpackError {
    fn from(err: serde_yaml::Error) -> Self {
        UnpackError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for UnpackError {
    fn from(err: serde_json::Error) -> Self {
        UnpackError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for UnpackError {
    fn from(err: git2::Error) -> Self {
        UnpackError::GitOperationFailed {
            message: err.message().to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, UnpackError>;
