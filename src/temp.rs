//! Base directory for scratch repositories
//!
//! Scratch repositories must never land under the current working
//! directory, which happens when `TMPDIR` is relative (`TMPDIR=tmp`).

use std::env;
use std::path::PathBuf;

/// An absolute directory suitable for temporary files
pub fn temp_dir_base() -> PathBuf {
    let dir = env::temp_dir();
    if dir.is_absolute() {
        return dir;
    }
    #[cfg(windows)]
    {
        env::var("TEMP")
            .or_else(|_| env::var("TMP"))
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
    }
    #[cfg(not(windows))]
    {
        PathBuf::from("/tmp")
    }
}
