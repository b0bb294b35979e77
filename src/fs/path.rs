//! Lexical path handling for the filesystem view
//!
//! View paths are slash-separated and unrooted. `.` names the root. They
//! never contain `.`/`..` elements or empty elements, so a valid path can
//! only name something below the root it is resolved against.

/// Lexically clean a slash-separated path.
///
/// Collapses duplicate slashes, drops `.` elements, and resolves `..`
/// against the preceding element. A leading `..` that cannot be resolved
/// is kept (for relative paths) or dropped (for rooted paths). An empty
/// result becomes `.`.
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut out: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match out.last() {
                Some(&last) if last != ".." => {
                    out.pop();
                }
                _ => {
                    if !rooted {
                        out.push("..");
                    }
                }
            },
            other => out.push(other),
        }
    }

    let joined = out.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// True if `path` is a valid view path
pub fn is_valid(path: &str) -> bool {
    if path == "." {
        return true;
    }
    !path.is_empty()
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

/// True if a cleaned relative path climbs out of its root
pub fn escapes_root(cleaned: &str) -> bool {
    cleaned == ".." || cleaned.starts_with("../") || cleaned.starts_with('/')
}

/// Join a valid view path onto a valid base path
pub fn join(base: &str, path: &str) -> String {
    match (base, path) {
        (".", p) => p.to_string(),
        (b, ".") => b.to_string(),
        (b, p) => format!("{b}/{p}"),
    }
}

/// Last element of a valid view path
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
