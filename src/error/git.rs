//! Git operation errors

use super::UnpackError;

/// Creates a clone/fetch failure carrying the captured remote progress
pub fn clone_failed(
    url: impl Into<String>,
    reason: impl Into<String>,
    progress: impl Into<String>,
) -> UnpackError {
    UnpackError::GitCloneFailed {
        url: url.into(),
        reason: reason.into(),
        progress: progress.into(),
    }
}

/// Creates a cancellation error
pub fn cancelled(url: impl Into<String>, reason: impl Into<String>) -> UnpackError {
    UnpackError::Cancelled {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates a checkout failure naming the requested commit
pub fn checkout_failed(sha: impl Into<String>, reason: impl Into<String>) -> UnpackError {
    UnpackError::GitCheckoutFailed {
        sha: sha.into(),
        reason: reason.into(),
    }
}

/// Creates a revision resolution failure
pub fn ref_resolve_failed(git_ref: impl Into<String>, reason: impl Into<String>) -> UnpackError {
    UnpackError::GitRefResolveFailed {
        git_ref: git_ref.into(),
        reason: reason.into(),
    }
}
