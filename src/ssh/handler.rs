//! SSH client handler implementation
//!
//! Implements the `russh::client::Handler` trait to handle SSH connection
//! events, in particular server host key verification.

use russh::keys::HashAlg;

/// Host key verification policy.
///
/// `TrustAny` preserves the trust-on-first-use behavior of classic
/// automation setups and is the default. Deployments that can distribute
/// fingerprints ahead of time should pin them with `Fingerprints`.
#[derive(Debug, Clone, Default)]
pub enum HostKeyPolicy {
    /// Accept whatever host key the server presents
    #[default]
    TrustAny,

    /// Accept only keys whose SHA-256 fingerprint is listed
    Fingerprints(Vec<String>),
}

/// SSH client handler for russh
///
/// Carries the host key policy; all other connection events use russh's
/// defaults.
#[derive(Debug, Clone)]
pub struct ClientHandler {
    policy: HostKeyPolicy,
}

impl ClientHandler {
    /// Create a handler enforcing the given host key policy
    pub fn new(policy: HostKeyPolicy) -> Self {
        Self { policy }
    }
}

impl Default for ClientHandler {
    fn default() -> Self {
        Self::new(HostKeyPolicy::TrustAny)
    }
}

impl russh::client::Handler for ClientHandler {
    type Error = anyhow::Error;

    /// Verify the server's host key against the configured policy.
    ///
    /// Returning `false` aborts the handshake, which the executor surfaces
    /// as a transport failure.
    async fn check_server_key(
        &mut self,
        server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        match &self.policy {
            HostKeyPolicy::TrustAny => Ok(true),
            HostKeyPolicy::Fingerprints(accepted) => {
                let presented = server_public_key.fingerprint(HashAlg::Sha256).to_string();
                Ok(accepted.iter().any(|fp| fp.trim() == presented))
            }
        }
    }
}
