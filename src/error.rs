//! Error types for the SSH execution gateway

use thiserror::Error;

/// Main error type for the gateway.
///
/// The first five variants form the closed set of outcomes a caller of
/// [`ExecGateway::run`](crate::gateway::ExecGateway::run) must handle.
/// `Config` and `Io` only occur while building the gateway and its inputs
/// (CLI arguments, key files, policy rules), never during a run.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Command rejected by the policy engine; never reached the network
    #[error("command rejected by policy: {0}")]
    PolicyViolation(String),

    /// Neither a password nor private key material was supplied
    #[error("no credential material supplied (password or private key required)")]
    MissingCredential,

    /// The remote host rejected the credential
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Handshake, timeout, or session-level protocol failure
    #[error("transport failure: {0}")]
    TransportFailed(String),

    /// Unexpected failure during command dispatch or stream read
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using GatewayError
pub type Result<T> = std::result::Result<T, GatewayError>;

impl GatewayError {
    /// Create a policy violation error from a string
    pub fn policy_violation(msg: impl Into<String>) -> Self {
        GatewayError::PolicyViolation(msg.into())
    }

    /// Create an authentication error from a string
    pub fn auth(msg: impl Into<String>) -> Self {
        GatewayError::AuthenticationFailed(msg.into())
    }

    /// Create a transport error from a string
    pub fn transport(msg: impl Into<String>) -> Self {
        GatewayError::TransportFailed(msg.into())
    }

    /// Create an execution error from a string
    pub fn execution(msg: impl Into<String>) -> Self {
        GatewayError::ExecutionFailed(msg.into())
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        GatewayError::Config(msg.into())
    }

    /// Whether the failure is correctable by the caller (4xx-equivalent).
    ///
    /// Policy violations and missing credentials mean the request itself was
    /// bad; authentication and transport failures mean the caller should
    /// check credentials or connectivity. Everything else is an opaque
    /// server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GatewayError::PolicyViolation(_)
                | GatewayError::MissingCredential
                | GatewayError::AuthenticationFailed(_)
                | GatewayError::TransportFailed(_)
        )
    }

    /// Whether the caller may reasonably retry. The gateway itself never
    /// retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::TransportFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GatewayError::transport("connection refused");
        assert_eq!(err.to_string(), "transport failure: connection refused");

        let err = GatewayError::policy_violation("contains blocked term 'shutdown'");
        assert_eq!(
            err.to_string(),
            "command rejected by policy: contains blocked term 'shutdown'"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(GatewayError::policy_violation("x").is_client_error());
        assert!(GatewayError::MissingCredential.is_client_error());
        assert!(GatewayError::auth("rejected").is_client_error());
        assert!(GatewayError::transport("reset").is_client_error());
        assert!(!GatewayError::execution("boom").is_client_error());
        assert!(!GatewayError::config("bad flag").is_client_error());
    }

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(GatewayError::transport("timeout").is_retryable());
        assert!(!GatewayError::auth("rejected").is_retryable());
        assert!(!GatewayError::policy_violation("x").is_retryable());
        assert!(!GatewayError::execution("boom").is_retryable());
    }
}
