//! Audit record boundary type
//!
//! The gateway itself writes no logs of record; it produces the field set
//! an external append-only audit writer persists. The writer assigns the
//! timestamp, which is why none appears here.

use serde::Serialize;

use crate::error::Result;
use crate::policy::SanitizedCommand;
use crate::ssh::ExecutionOutcome;

/// One invocation's worth of audit fields.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    /// Reference to the resolved caller identity
    pub user: String,

    /// Reference to the target host
    pub host: String,

    /// The command exactly as the caller submitted it
    pub submitted_command: String,

    /// The sanitized form that would be (or was) transmitted
    pub command: String,

    /// Standard output (empty on failure)
    pub stdout: String,

    /// Standard error (empty on failure)
    pub stderr: String,

    /// Remote exit code, when the command ran to completion
    pub exit_code: Option<u32>,

    /// Wall-clock execution time in seconds, when the command ran
    pub duration_secs: Option<f64>,

    /// Classified failure text, when the invocation did not succeed
    pub error: Option<String>,
}

impl AuditRecord {
    /// Assemble the audit fields for one gateway invocation.
    ///
    /// Error text comes from the classified error's `Display` impl, which
    /// never embeds secret material.
    pub fn new(
        user: impl Into<String>,
        host: impl Into<String>,
        submitted_command: impl Into<String>,
        sanitized: &SanitizedCommand,
        result: &Result<ExecutionOutcome>,
    ) -> Self {
        let (stdout, stderr, exit_code, duration_secs, error) = match result {
            Ok(outcome) => (
                outcome.stdout.clone(),
                outcome.stderr.clone(),
                outcome.exit_code,
                Some(outcome.duration),
                None,
            ),
            Err(e) => (String::new(), String::new(), None, None, Some(e.to_string())),
        };

        Self {
            user: user.into(),
            host: host.into(),
            submitted_command: submitted_command.into(),
            command: sanitized.as_str().to_string(),
            stdout,
            stderr,
            exit_code,
            duration_secs,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use crate::policy::{CommandPolicy, PolicyRules};

    fn sanitized(raw: &str) -> SanitizedCommand {
        CommandPolicy::new(&PolicyRules::default())
            .unwrap()
            .sanitize(raw)
    }

    #[test]
    fn test_record_for_successful_run() {
        let outcome = ExecutionOutcome {
            stdout: "total 4\n".to_string(),
            stderr: String::new(),
            exit_code: Some(0),
            duration: 0.42,
        };
        let record = AuditRecord::new(
            "user-1",
            "web-01",
            "ls -la",
            &sanitized("ls -la"),
            &Ok(outcome),
        );

        assert_eq!(record.command, "ls -la");
        assert_eq!(record.exit_code, Some(0));
        assert_eq!(record.duration_secs, Some(0.42));
        assert!(record.error.is_none());
    }

    #[test]
    fn test_record_for_rejected_command() {
        let result = Err(GatewayError::policy_violation("contains blocked term 'shutdown'"));
        let record = AuditRecord::new(
            "user-1",
            "web-01",
            "shutdown -h now",
            &sanitized("shutdown -h now"),
            &result,
        );

        assert_eq!(record.submitted_command, "shutdown -h now");
        assert!(record.exit_code.is_none());
        assert!(record.duration_secs.is_none());
        assert!(record.error.unwrap().contains("blocked term"));
    }

    #[test]
    fn test_record_serializes_without_timestamp() {
        let record = AuditRecord::new(
            "user-1",
            "web-01",
            "uptime",
            &sanitized("uptime"),
            &Ok(ExecutionOutcome::default()),
        );
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"submitted_command\""));
        assert!(!json.contains("timestamp"));
    }
}
