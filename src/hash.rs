//! BLAKE3 content digests of bundle views
//!
//! Two views with the same files, modes and symlink targets have the same
//! digest regardless of how they were fetched, which makes digests useful
//! for checking that a pinned source reproduces the content it pinned.

use std::io::Read;

use blake3::Hasher;

use crate::error::{Result, fs};
use crate::fs::{BundleFs, FilesystemView};

/// Hash prefix for BLAKE3 digests
pub const HASH_PREFIX: &str = "blake3:";

/// Digest every file and symlink in `view`.
///
/// Entries are hashed in sorted path order as `path NUL mode NUL content
/// NUL`. Empty directories do not contribute.
pub fn digest_view(view: &BundleFs) -> Result<String> {
    let mut entries: Vec<_> = view
        .walk(".")?
        .into_iter()
        .filter(|(_, meta)| !meta.is_dir())
        .collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];
    for (path, meta) in entries {
        hasher.update(path.as_bytes());
        hasher.update(b"\0");
        hasher.update(format!("{:o}", meta.mode()).as_bytes());
        hasher.update(b"\0");

        let mut file = view
            .open(&path)?
            .into_file()
            .ok_or_else(|| fs::is_a_directory("open", &path))?;
        loop {
            let n = file
                .read(&mut buffer)
                .map_err(|e| fs::io_error(format!("read {path}: {e}")))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        file.close()?;
        hasher.update(b"\0");
    }

    Ok(format!("{HASH_PREFIX}{}", hasher.finalize().to_hex()))
}

/// Compare two digests, with or without the `blake3:` prefix
pub fn verify_digest(expected: &str, actual: &str) -> bool {
    let strip = |h: &str| h.strip_prefix(HASH_PREFIX).unwrap_or(h).to_ascii_lowercase();
    strip(expected) == strip(actual)
}
