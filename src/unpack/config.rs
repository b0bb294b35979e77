//! Unpacker configuration

use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::temp::temp_dir_base;

/// Directory under which scratch repositories are created
pub const TMPDIR_ENV: &str = "BUNDLE_UNPACK_TMPDIR";
/// Set to `0` or `false` to always fetch full history
pub const SHALLOW_ENV: &str = "BUNDLE_UNPACK_SHALLOW";

/// Settings for [`super::GitUnpacker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUnpackerConfig {
    /// Parent directory for per-call scratch repositories
    pub temp_base: PathBuf,
    /// Use depth-1 fetches for branch and tag refs on remote transports
    pub shallow: bool,
}

impl Default for GitUnpackerConfig {
    fn default() -> Self {
        Self {
            temp_base: temp_dir_base(),
            shallow: true,
        }
    }
}

impl GitUnpackerConfig {
    /// Defaults overridden by `BUNDLE_UNPACK_TMPDIR` and `BUNDLE_UNPACK_SHALLOW`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(TMPDIR_ENV).filter(|d| !d.is_empty()) {
            let dir = PathBuf::from(dir);
            if dir.is_absolute() {
                config.temp_base = dir;
            } else {
                warn!(path = %dir.display(), "ignoring relative {TMPDIR_ENV}");
            }
        }

        if let Some(value) = lookup(SHALLOW_ENV) {
            config.shallow = !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false");
        }

        config
    }
}
