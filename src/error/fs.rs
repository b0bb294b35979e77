//! File system view errors
//!
//! Every constructor takes the operation name and the path it was applied
//! to, so messages read like `readdir sub/dir: not a directory`.

use super::UnpackError;

pub fn not_found(op: &'static str, path: impl Into<String>) -> UnpackError {
    UnpackError::NotFound {
        op,
        path: path.into(),
    }
}

pub fn is_a_directory(op: &'static str, path: impl Into<String>) -> UnpackError {
    UnpackError::IsADirectory {
        op,
        path: path.into(),
    }
}

pub fn not_a_directory(op: &'static str, path: impl Into<String>) -> UnpackError {
    UnpackError::NotADirectory {
        op,
        path: path.into(),
    }
}

pub fn handle_closed(op: &'static str, path: impl Into<String>) -> UnpackError {
    UnpackError::HandleClosed {
        op,
        path: path.into(),
    }
}

pub fn invalid_path(op: &'static str, path: impl Into<String>) -> UnpackError {
    UnpackError::InvalidPath {
        op,
        path: path.into(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> UnpackError {
    UnpackError::IoError {
        message: message.into(),
    }
}
