//! Execution gateway
//!
//! Composition root for one command invocation: policy first, then the
//! session executor. This is the only entry point intended for callers.

use tracing::{debug, info};

use crate::error::{GatewayError, Result};
use crate::policy::CommandPolicy;
use crate::ssh::{Credential, ExecutionOutcome, SessionExecutor};

/// Execution gateway.
///
/// Pure orchestration over explicit instances handed in at construction;
/// holds no per-request state, so one gateway can serve concurrent callers.
#[derive(Debug)]
pub struct ExecGateway {
    policy: CommandPolicy,
    executor: SessionExecutor,
}

impl ExecGateway {
    /// Build a gateway from a compiled policy and a session executor
    pub fn new(policy: CommandPolicy, executor: SessionExecutor) -> Self {
        Self { policy, executor }
    }

    /// The policy engine backing this gateway
    pub fn policy(&self) -> &CommandPolicy {
        &self.policy
    }

    /// Run one raw command against one credential.
    ///
    /// Sanitizes and evaluates the command; a rejected command returns
    /// `PolicyViolation` without any network I/O. An accepted command is
    /// executed in its sanitized form and the executor's outcome is
    /// returned unchanged. No retries; each outcome is produced exactly
    /// once.
    pub async fn run(&self, credential: &Credential, raw_command: &str) -> Result<ExecutionOutcome> {
        let sanitized = self.policy.sanitize(raw_command);
        let decision = self.policy.evaluate_sanitized(&sanitized);

        if !decision.allowed {
            let reason = decision
                .reason
                .unwrap_or_else(|| "rejected by policy".to_string());
            info!(
                "Rejected command for {}@{}: {}",
                credential.username, credential.host, reason
            );
            return Err(GatewayError::policy_violation(reason));
        }

        debug!(
            "Policy accepted command for {}@{}",
            credential.username, credential.host
        );

        self.executor.execute(credential, &sanitized).await
    }
}
