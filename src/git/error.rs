//! Readable descriptions of libgit2 failures
//!
//! libgit2 messages are precise but noisy. Transport failures are sorted
//! into a few categories so the caller can tell a missing repository from a
//! refused credential or a broken TLS handshake; the raw message is kept as
//! detail.

use git2::{Error, ErrorClass, ErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    NotFound,
    Auth,
    Denied,
    Network,
    Tls,
    Other,
}

type Matcher = fn(&str, &Error) -> bool;

const MATCHERS: &[(Matcher, Failure)] = &[
    (
        |msg, err| {
            err.code() == ErrorCode::NotFound
                || msg.contains("not found")
                || msg.contains("404")
                || msg.contains("does not appear to be a git repository")
                || msg.contains("could not find repository")
        },
        Failure::NotFound,
    ),
    (
        |msg, err| {
            err.code() == ErrorCode::Auth
                || msg.contains("authentication")
                || msg.contains("credentials")
        },
        Failure::Auth,
    ),
    (
        |msg, _| msg.contains("permission denied") || msg.contains("access denied"),
        Failure::Denied,
    ),
    (
        |msg, err| {
            err.code() == ErrorCode::Certificate
                || err.class() == ErrorClass::Ssl
                || msg.contains("certificate")
                || msg.contains("ssl")
        },
        Failure::Tls,
    ),
    (
        |msg, err| {
            err.class() == ErrorClass::Net
                || msg.contains("connection")
                || msg.contains("timed out")
                || msg.contains("resolve")
        },
        Failure::Network,
    ),
];

fn classify(err: &Error) -> Failure {
    let message = err.message().to_lowercase();
    MATCHERS
        .iter()
        .find(|(matches, _)| matches(&message, err))
        .map_or(Failure::Other, |(_, failure)| *failure)
}

/// Describe a libgit2 error for a clone or fetch failure
pub fn interpret_git_error(err: &Error) -> String {
    let detail = err.message().trim();
    let summary = match classify(err) {
        Failure::NotFound => "repository not found",
        Failure::Auth => "authentication failed",
        Failure::Denied => "permission denied",
        Failure::Network => "network error",
        Failure::Tls => "TLS verification failed",
        Failure::Other => return detail.to_string(),
    };
    if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}: {detail}")
    }
}
