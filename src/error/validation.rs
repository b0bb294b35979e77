//! Descriptor validation and containment errors

use super::UnpackError;

/// Creates an unsupported source type error
pub fn unsupported_type(kind: impl Into<String>) -> UnpackError {
    UnpackError::UnsupportedSourceType { kind: kind.into() }
}

/// Creates a missing per-kind configuration error
pub fn configuration_unset(kind: impl Into<String>) -> UnpackError {
    UnpackError::ConfigurationUnset { kind: kind.into() }
}

/// Creates an invalid git ref error
pub fn invalid_ref(message: impl Into<String>) -> UnpackError {
    UnpackError::InvalidRef {
        message: message.into(),
    }
}

/// Creates a subdirectory containment error
pub fn subdirectory_invalid(
    directory: impl Into<String>,
    repository: impl Into<String>,
    reason: impl Into<String>,
) -> UnpackError {
    UnpackError::SubdirectoryInvalid {
        directory: directory.into(),
        repository: repository.into(),
        reason: reason.into(),
    }
}
