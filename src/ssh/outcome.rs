//! Execution outcome type

use serde::Serialize;

/// Result of one successful command execution.
///
/// Created at the end of a [`SessionExecutor`](super::SessionExecutor)
/// call and handed through the gateway to the caller; the gateway keeps no
/// copy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionOutcome {
    /// Standard output from the command
    pub stdout: String,

    /// Standard error from the command
    pub stderr: String,

    /// Exit code of the remote process (None if the channel closed without
    /// reporting one)
    pub exit_code: Option<u32>,

    /// Wall-clock seconds from connection-attempt start to stream
    /// completion
    pub duration: f64,
}

impl ExecutionOutcome {
    /// Check if the command succeeded (exit code 0 or no exit code
    /// available)
    pub fn success(&self) -> bool {
        self.exit_code.is_none_or(|code| code == 0)
    }
}
