//! Transport authentication and TLS policy
//!
//! Credentials come from the ambient git environment only:
//! - the SSH agent, then keys in `~/.ssh/`
//! - git credential helpers from the user's git config
//! - anonymous access as a last resort
//!
//! Descriptor-supplied secrets are not resolved here; see
//! [`crate::unpack::GitUnpacker`].

use std::path::PathBuf;

use git2::{CertificateCheckStatus, Cred, CredentialType, Error, ErrorClass, ErrorCode, RemoteCallbacks};
use tracing::{debug, warn};

const SSH_KEY_NAMES: &[&str] = &["id_ed25519", "id_ecdsa", "id_rsa"];

fn auth_error(message: &str) -> Error {
    Error::new(ErrorCode::Auth, ErrorClass::Http, message)
}

fn ssh_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ssh"))
}

fn ssh_key_credentials(username: &str) -> Result<Cred, Error> {
    let dir = ssh_dir().ok_or_else(|| auth_error("no home directory for SSH keys"))?;
    SSH_KEY_NAMES
        .iter()
        .map(|name| (dir.join(name), dir.join(format!("{name}.pub"))))
        .filter(|(private, _)| private.exists())
        .find_map(|(private, public)| {
            let public = public.exists().then_some(public.as_path());
            Cred::ssh_key(username, public, &private, None).ok()
        })
        .ok_or_else(|| auth_error("no usable SSH key found"))
}

fn helper_credentials(url: &str, username: Option<&str>) -> Result<Cred, Error> {
    let config = git2::Config::open_default().or_else(|_| git2::Config::new())?;
    Cred::credential_helper(&config, url, username)
        .or_else(|_| Cred::userpass_plaintext(username.unwrap_or("git"), ""))
}

/// Install credential and certificate callbacks.
///
/// With `insecure_skip_verify` every server certificate is accepted;
/// otherwise libgit2's own verification decides.
pub fn configure_callbacks(callbacks: &mut RemoteCallbacks<'_>, insecure_skip_verify: bool) {
    callbacks.credentials(|url, username_from_url, allowed| {
        if allowed.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }
        if allowed.contains(CredentialType::SSH_KEY) {
            let username = username_from_url.unwrap_or("git");
            return Cred::ssh_key_from_agent(username).or_else(|_| ssh_key_credentials(username));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return helper_credentials(url, username_from_url);
        }
        debug!(?allowed, url, "no supported credential type offered");
        Err(auth_error("authentication failed"))
    });

    if insecure_skip_verify {
        callbacks.certificate_check(|_cert, host| {
            warn!(host, "skipping TLS certificate verification");
            Ok(CertificateCheckStatus::CertificateOk)
        });
    }
}
