//! Session executor
//!
//! Owns the lifecycle of a single authenticated SSH session: connect,
//! execute with a bounded time budget, collect output, disconnect. Every
//! call opens and tears down its own session; nothing is pooled or reused
//! across invocations, so concurrent callers share no mutable state and a
//! hung host can only stall its own invocation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use russh::client::{self, Handle};
use russh::keys::PrivateKeyWithHashAlg;
use russh::ChannelMsg;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::credential::{AuthMethod, Credential};
use super::handler::{ClientHandler, HostKeyPolicy};
use super::outcome::ExecutionOutcome;
use crate::config::{DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS, PROBE_TIMEOUT_SECS};
use crate::error::{GatewayError, Result};
use crate::policy::SanitizedCommand;

/// Fixed introspection command for connection probes. Runs without policy
/// evaluation; it is hardcoded, not caller input.
const PROBE_COMMAND: &str = "echo 'connection ok'";
const PROBE_MARKER: &str = "connection ok";

/// Session Executor
///
/// Holds only time budgets and the host key policy; all per-invocation
/// state (session handle, channel, buffers) lives on the stack of the call
/// that owns it. Dropping an in-flight `execute` future (caller
/// cancellation) drops the underlying handle and tears the session down.
#[derive(Debug, Clone)]
pub struct SessionExecutor {
    /// Budget for connection establishment plus authentication
    connect_timeout: Duration,

    /// Budget for command execution and stream collection
    command_timeout: Duration,

    /// Total budget for `test_connection`
    probe_timeout: Duration,

    /// Host key verification policy
    host_key_policy: HostKeyPolicy,
}

impl SessionExecutor {
    /// Create an executor with the default budgets (30s connect, 30s
    /// command, 10s probe) and trust-on-first-use host keys.
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
            host_key_policy: HostKeyPolicy::TrustAny,
        }
    }

    /// Set the connection-establishment budget
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the command-execution budget
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set the host key verification policy
    pub fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    /// Execute a sanitized command on the remote host.
    ///
    /// Connects, authenticates, runs the command on a fresh exec channel
    /// (no PTY), collects stdout/stderr to completion or timeout, reads the
    /// exit status, and disconnects. The session is closed on every exit
    /// path; a timed-out command gets an explicit disconnect rather than an
    /// abandoned socket.
    ///
    /// # Errors
    /// * `AuthenticationFailed` - the host rejected the credential
    /// * `TransportFailed` - handshake, timeout, or protocol failure
    /// * `ExecutionFailed` - unexpected failure during dispatch
    pub async fn execute(
        &self,
        credential: &Credential,
        command: &SanitizedCommand,
    ) -> Result<ExecutionOutcome> {
        let started = Instant::now();
        let session = self.connect(credential).await?;

        debug!(
            "Executing command on {}@{}",
            credential.username,
            credential.addr()
        );

        let result = self
            .run_command(&session, command.as_str(), self.command_timeout)
            .await;
        let elapsed = started.elapsed().as_secs_f64();

        // Teardown on every exit path, including timeout
        let _ = session
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await;

        let mut outcome = result?;
        outcome.duration = elapsed;

        debug!(
            "Command completed: exit_code={:?}, stdout_len={}, stderr_len={}, duration={:.3}s",
            outcome.exit_code,
            outcome.stdout.len(),
            outcome.stderr.len(),
            outcome.duration
        );

        Ok(outcome)
    }

    /// Best-effort liveness probe for a stored credential.
    ///
    /// Runs a fixed introspection command under a 10-second total budget
    /// and converts every failure (unreachable host, bad credential,
    /// timeout) to `false`. Never returns an error.
    pub async fn test_connection(&self, credential: &Credential) -> bool {
        let probe = async {
            let session = self.connect(credential).await?;
            let result = self
                .run_command(&session, PROBE_COMMAND, self.probe_timeout)
                .await;
            let _ = session
                .disconnect(russh::Disconnect::ByApplication, "", "")
                .await;
            result
        };

        match timeout(self.probe_timeout, probe).await {
            Ok(Ok(outcome)) => outcome.stdout.contains(PROBE_MARKER),
            Ok(Err(e)) => {
                debug!("Connection probe to {} failed: {}", credential.addr(), e);
                false
            }
            Err(_) => {
                debug!(
                    "Connection probe to {} timed out after {}s",
                    credential.addr(),
                    self.probe_timeout.as_secs()
                );
                false
            }
        }
    }

    /// Establish and authenticate a session
    async fn connect(&self, credential: &Credential) -> Result<Handle<ClientHandler>> {
        let addr = credential.addr();
        info!("Connecting to SSH server {}...", addr);

        let config = Arc::new(client::Config::default());
        let handler = ClientHandler::new(self.host_key_policy.clone());

        let connect_result = timeout(
            self.connect_timeout,
            client::connect(config, addr.as_str(), handler),
        )
        .await;

        let mut session = match connect_result {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                warn!("SSH connection to {} failed: {}", addr, e);
                return Err(GatewayError::transport(format!(
                    "connection to {} failed: {}",
                    addr, e
                )));
            }
            Err(_) => {
                warn!(
                    "SSH connection to {} timed out after {}s",
                    addr,
                    self.connect_timeout.as_secs()
                );
                return Err(GatewayError::transport(format!(
                    "connection to {} timed out after {}s",
                    addr,
                    self.connect_timeout.as_secs()
                )));
            }
        };

        if let Err(e) = self.authenticate(credential, &mut session).await {
            // No leaked half-open session behind an auth failure
            let _ = session
                .disconnect(russh::Disconnect::ByApplication, "", "")
                .await;
            return Err(e);
        }

        Ok(session)
    }

    /// Authenticate with the SSH server.
    ///
    /// Protocol errors during the auth exchange are transport failures; the
    /// server rejecting the credential is an authentication failure. Error
    /// messages carry the username and host, never the secret.
    async fn authenticate(
        &self,
        credential: &Credential,
        session: &mut Handle<ClientHandler>,
    ) -> Result<()> {
        match &credential.auth {
            AuthMethod::Password(password) => {
                debug!(
                    "Attempting password authentication for user '{}'",
                    credential.username
                );
                let auth_result = session
                    .authenticate_password(&credential.username, password)
                    .await
                    .map_err(|e| GatewayError::transport(e.to_string()))?;

                if auth_result.success() {
                    Ok(())
                } else {
                    Err(GatewayError::auth(format!(
                        "password rejected for user '{}' at {}",
                        credential.username,
                        credential.addr()
                    )))
                }
            }
            AuthMethod::PrivateKey(key_content) => {
                debug!(
                    "Attempting key authentication for user '{}'",
                    credential.username
                );
                let key = russh::keys::PrivateKey::from_openssh(key_content.as_bytes())
                    .map_err(|e| {
                        GatewayError::auth(format!("failed to parse private key: {}", e))
                    })?;

                let key_with_alg = PrivateKeyWithHashAlg::new(Arc::new(key), None);

                let auth_result = session
                    .authenticate_publickey(&credential.username, key_with_alg)
                    .await
                    .map_err(|e| GatewayError::transport(e.to_string()))?;

                if auth_result.success() {
                    Ok(())
                } else {
                    Err(GatewayError::auth(format!(
                        "key rejected for user '{}' at {}",
                        credential.username,
                        credential.addr()
                    )))
                }
            }
        }
    }

    /// Run one command on a fresh exec channel and collect its output
    async fn run_command(
        &self,
        session: &Handle<ClientHandler>,
        command: &str,
        limit: Duration,
    ) -> Result<ExecutionOutcome> {
        let channel = session
            .channel_open_session()
            .await
            .map_err(|e| GatewayError::transport(format!("failed to open channel: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| GatewayError::execution(format!("failed to dispatch command: {}", e)))?;

        match timeout(limit, Self::collect_channel_output(channel)).await {
            Ok(output) => output,
            Err(_) => {
                warn!("Command timed out after {}s", limit.as_secs());
                Err(GatewayError::transport(format!(
                    "command timed out after {}s",
                    limit.as_secs()
                )))
            }
        }
    }

    /// Collect stdout/stderr and the exit status until the channel closes
    async fn collect_channel_output(
        mut channel: russh::Channel<client::Msg>,
    ) -> Result<ExecutionOutcome> {
        let mut outcome = ExecutionOutcome::default();

        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { data } => {
                    outcome.stdout.push_str(&String::from_utf8_lossy(&data));
                }
                ChannelMsg::ExtendedData { data, ext } => {
                    // ext == 1 is stderr
                    if ext == 1 {
                        outcome.stderr.push_str(&String::from_utf8_lossy(&data));
                    } else {
                        outcome.stdout.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                ChannelMsg::ExitStatus { exit_status } => {
                    outcome.exit_code = Some(exit_status);
                }
                ChannelMsg::Close | ChannelMsg::Eof => {
                    break;
                }
                _ => {
                    // Ignore other messages
                }
            }
        }

        Ok(outcome)
    }
}

impl Default for SessionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_defaults() {
        let executor = SessionExecutor::new();
        assert_eq!(executor.connect_timeout, Duration::from_secs(30));
        assert_eq!(executor.command_timeout, Duration::from_secs(30));
        assert_eq!(executor.probe_timeout, Duration::from_secs(10));
        assert!(matches!(executor.host_key_policy, HostKeyPolicy::TrustAny));
    }

    #[test]
    fn test_executor_builder() {
        let executor = SessionExecutor::new()
            .with_connect_timeout(Duration::from_secs(5))
            .with_command_timeout(Duration::from_secs(60))
            .with_host_key_policy(HostKeyPolicy::Fingerprints(vec!["SHA256:x".into()]));
        assert_eq!(executor.connect_timeout, Duration::from_secs(5));
        assert_eq!(executor.command_timeout, Duration::from_secs(60));
        assert!(matches!(
            executor.host_key_policy,
            HostKeyPolicy::Fingerprints(_)
        ));
    }

    #[tokio::test]
    async fn test_execute_against_refused_port_is_transport_failure() {
        let executor = SessionExecutor::new().with_connect_timeout(Duration::from_secs(2));
        let credential = Credential::new(
            "127.0.0.1",
            "nobody",
            AuthMethod::Password("irrelevant".into()),
        )
        .with_port(1);

        let policy = crate::policy::CommandPolicy::new(&crate::policy::PolicyRules::default())
            .unwrap();
        let command = policy.sanitize("ls");

        let err = executor.execute(&credential, &command).await.unwrap_err();
        assert!(matches!(err, GatewayError::TransportFailed(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_probe_returns_false_for_refused_port() {
        let executor = SessionExecutor::new().with_connect_timeout(Duration::from_secs(2));
        let credential = Credential::new(
            "127.0.0.1",
            "nobody",
            AuthMethod::Password("irrelevant".into()),
        )
        .with_port(1);

        assert!(!executor.test_connection(&credential).await);
    }
}
