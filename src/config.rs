//! Configuration and CLI argument parsing for the SSH gateway

use clap::Parser;
use std::path::PathBuf;

use crate::error::{GatewayError, Result};

/// Default budget for command execution in seconds
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Default budget for connection establishment in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Total budget for connection probes in seconds
pub const PROBE_TIMEOUT_SECS: u64 = 10;

/// SSH gateway CLI arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "ssh-gateway")]
#[command(version)]
#[command(about = "Run one policy-checked command on a remote host over SSH")]
pub struct Args {
    /// Remote host to connect to
    #[arg(long, env = "SSH_GATEWAY_HOST")]
    pub host: String,

    /// SSH port
    #[arg(long, default_value = "22", env = "SSH_GATEWAY_PORT")]
    pub port: u16,

    /// SSH username
    #[arg(long, env = "SSH_GATEWAY_USER")]
    pub user: String,

    /// SSH password (alternative to key)
    #[arg(long, env = "SSH_GATEWAY_PASSWORD")]
    pub password: Option<String>,

    /// Path to SSH private key file (alternative to password)
    #[arg(long, env = "SSH_GATEWAY_KEY")]
    pub key: Option<PathBuf>,

    /// Connection-establishment budget in seconds
    #[arg(long, default_value = "30", env = "SSH_GATEWAY_CONNECT_TIMEOUT")]
    pub connect_timeout: u64,

    /// Command-execution budget in seconds
    #[arg(long, default_value = "30", env = "SSH_GATEWAY_TIMEOUT")]
    pub timeout: u64,

    /// Accepted SHA-256 host key fingerprint (repeatable). Without any,
    /// the presented host key is trusted as-is.
    #[arg(long = "host-key", env = "SSH_GATEWAY_HOST_KEYS", value_delimiter = ',')]
    pub host_keys: Vec<String>,

    /// Only probe connectivity with the stored credential, run nothing
    #[arg(long, default_value = "false")]
    pub probe: bool,

    /// Command to execute on the remote host
    pub command: Option<String>,
}

/// Parsed and validated configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote host
    pub host: String,

    /// SSH port
    pub port: u16,

    /// SSH username
    pub user: String,

    /// SSH password
    pub password: Option<String>,

    /// Path to SSH private key
    pub key: Option<PathBuf>,

    /// Connection budget in seconds
    pub connect_timeout_secs: u64,

    /// Command budget in seconds
    pub command_timeout_secs: u64,

    /// Pinned host key fingerprints (empty = trust any)
    pub host_keys: Vec<String>,

    /// Probe-only mode
    pub probe: bool,

    /// Command to execute (absent in probe mode)
    pub command: Option<String>,
}

impl Config {
    /// Create Config from CLI Args
    pub fn from_args(args: Args) -> Result<Self> {
        validate_args(&args)?;

        Ok(Config {
            host: args.host,
            port: args.port,
            user: args.user,
            password: filter_empty(args.password),
            key: args.key,
            connect_timeout_secs: args.connect_timeout,
            command_timeout_secs: args.timeout,
            host_keys: args.host_keys,
            probe: args.probe,
            command: args.command,
        })
    }
}

/// Validate CLI arguments
fn validate_args(args: &Args) -> Result<()> {
    let mut errors = Vec::new();

    if args.host.is_empty() {
        errors.push("Missing required --host".to_string());
    }

    if args.user.is_empty() {
        errors.push("Missing required --user".to_string());
    }

    let has_password = args.password.as_deref().is_some_and(|p| !p.is_empty());

    if !has_password && args.key.is_none() {
        errors.push("Must provide either --password or --key".to_string());
    }

    if has_password && args.key.is_some() {
        errors.push("Provide either --password or --key, not both".to_string());
    }

    if let Some(ref key_path) = args.key {
        if !key_path.exists() {
            errors.push(format!("SSH key file not found: {}", key_path.display()));
        }
    }

    if !args.probe && args.command.as_deref().map_or(true, |c| c.trim().is_empty()) {
        errors.push("Missing command to execute (or pass --probe)".to_string());
    }

    if !errors.is_empty() {
        return Err(GatewayError::Config(format!(
            "Configuration error:\n{}",
            errors.join("\n")
        )));
    }

    Ok(())
}

/// Treat an empty password as absent
fn filter_empty(password: Option<String>) -> Option<String> {
    password.filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            host: "198.51.100.7".to_string(),
            port: 22,
            user: "admin".to_string(),
            password: Some("secret".to_string()),
            key: None,
            connect_timeout: 30,
            timeout: 30,
            host_keys: Vec::new(),
            probe: false,
            command: Some("uptime".to_string()),
        }
    }

    #[test]
    fn test_valid_args_accepted() {
        let config = Config::from_args(base_args()).unwrap();
        assert_eq!(config.host, "198.51.100.7");
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.command.as_deref(), Some("uptime"));
    }

    #[test]
    fn test_missing_credential_rejected() {
        let args = Args {
            password: None,
            ..base_args()
        };
        let err = Config::from_args(args).unwrap_err();
        assert!(err.to_string().contains("--password or --key"));
    }

    #[test]
    fn test_both_credentials_rejected() {
        let args = Args {
            key: Some(PathBuf::from("/nonexistent/id_ed25519")),
            ..base_args()
        };
        let err = Config::from_args(args).unwrap_err();
        assert!(err.to_string().contains("not both"));
    }

    #[test]
    fn test_missing_command_rejected_unless_probe() {
        let args = Args {
            command: None,
            ..base_args()
        };
        assert!(Config::from_args(args).is_err());

        let args = Args {
            command: None,
            probe: true,
            ..base_args()
        };
        assert!(Config::from_args(args).is_ok());
    }

    #[test]
    fn test_empty_password_filtered() {
        let args = Args {
            password: Some(String::new()),
            key: Some(PathBuf::from("/nonexistent/id_ed25519")),
            ..base_args()
        };
        // Empty password counts as absent, so only the key remains, which
        // then fails on existence
        let err = Config::from_args(args).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
