//! SSH Gateway - policy-guarded remote command execution
//!
//! This crate executes single shell commands on remote Linux hosts over
//! SSH, gated by a command policy. A raw command is sanitized and checked
//! against blocklist, dangerous-pattern, and allow-prefix tables before any
//! network I/O happens; accepted commands run in one throwaway
//! authenticated session under bounded time budgets.
//!
//! # Components
//!
//! - [`policy::CommandPolicy`] - sanitizes commands and decides whether
//!   they may run; rules are data, not code
//! - [`ssh::SessionExecutor`] - owns one session per invocation: connect,
//!   execute, collect, disconnect
//! - [`gateway::ExecGateway`] - composition root callers invoke
//! - [`audit::AuditRecord`] - the field set handed to an external audit
//!   writer
//!
//! # Example
//!
//! ```no_run
//! use ssh_gateway::gateway::ExecGateway;
//! use ssh_gateway::policy::{CommandPolicy, PolicyRules};
//! use ssh_gateway::ssh::{AuthMethod, Credential, SessionExecutor};
//!
//! # async fn run() -> ssh_gateway::Result<()> {
//! let policy = CommandPolicy::new(&PolicyRules::default())?;
//! let gateway = ExecGateway::new(policy, SessionExecutor::new());
//!
//! let credential = Credential::new(
//!     "192.168.1.100",
//!     "admin",
//!     AuthMethod::Password("secret".into()),
//! );
//!
//! let outcome = gateway.run(&credential, "uptime").await?;
//! println!("{}", outcome.stdout);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod gateway;
pub mod policy;
pub mod ssh;

// Re-exports for convenience
pub use audit::AuditRecord;
pub use config::{Args, Config};
pub use error::{GatewayError, Result};
pub use gateway::ExecGateway;
pub use policy::{CommandPolicy, PolicyDecision, PolicyRules, SanitizedCommand};
pub use ssh::{AuthMethod, ClientHandler, Credential, ExecutionOutcome, HostKeyPolicy, SessionExecutor};
