//! SSH session management module
//!
//! One authenticated session per invocation: connect, execute with a
//! bounded budget, collect, disconnect. No connection pooling.

pub mod credential;
pub mod handler;
pub mod outcome;
pub mod session;

// Re-exports
pub use credential::{AuthMethod, Credential};
pub use handler::{ClientHandler, HostKeyPolicy};
pub use outcome::ExecutionOutcome;
pub use session::SessionExecutor;
