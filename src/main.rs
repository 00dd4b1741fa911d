//! SSH Gateway - CLI entry point
//!
//! One-shot driver standing in for an API caller: resolve a credential
//! from flags/env, run a single policy-checked command through the
//! gateway, emit the audit record, and map the outcome to an exit code.

use std::time::Duration;

use clap::Parser;
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

use ssh_gateway::audit::AuditRecord;
use ssh_gateway::config::{Args, Config};
use ssh_gateway::error::Result;
use ssh_gateway::gateway::ExecGateway;
use ssh_gateway::policy::{CommandPolicy, PolicyRules};
use ssh_gateway::ssh::{AuthMethod, Credential, HostKeyPolicy, SessionExecutor};

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_args(args)?;

    let credential = build_credential(&config).await?;

    let host_key_policy = if config.host_keys.is_empty() {
        HostKeyPolicy::TrustAny
    } else {
        HostKeyPolicy::Fingerprints(config.host_keys.clone())
    };

    let executor = SessionExecutor::new()
        .with_connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .with_command_timeout(Duration::from_secs(config.command_timeout_secs))
        .with_host_key_policy(host_key_policy);

    if config.probe {
        info!("Probing {}@{}:{}...", config.user, config.host, config.port);
        if executor.test_connection(&credential).await {
            println!("connection ok");
            return Ok(());
        }
        eprintln!("connection failed");
        std::process::exit(1);
    }

    let command = config.command.clone().unwrap_or_default();

    let policy = CommandPolicy::new(&PolicyRules::default())?;
    let sanitized = policy.sanitize(&command);
    let gateway = ExecGateway::new(policy, executor);

    info!(
        "Executing on {}@{}:{} (timeout {}s)",
        config.user, config.host, config.port, config.command_timeout_secs
    );

    let result = gateway.run(&credential, &command).await;

    // The audit writer is external; hand it the record as a JSON line
    let record = AuditRecord::new(&config.user, &config.host, &command, &sanitized, &result);
    match serde_json::to_string(&record) {
        Ok(json) => debug!("audit record: {}", json),
        Err(e) => debug!("audit record serialization failed: {}", e),
    }

    match result {
        Ok(outcome) => {
            if !outcome.stdout.is_empty() {
                print!("{}", outcome.stdout);
            }
            if !outcome.stderr.is_empty() {
                eprint!("{}", outcome.stderr);
            }
            info!("Completed in {:.3}s", outcome.duration);
            std::process::exit(outcome.exit_code.unwrap_or(0).min(i32::MAX as u32) as i32);
        }
        Err(e) => {
            error!("{}", e);
            // Client-correctable failures and opaque server-side ones get
            // distinct exit codes, mirroring the 4xx/5xx split
            std::process::exit(if e.is_client_error() { 2 } else { 3 });
        }
    }
}

/// Resolve the credential from config, reading key material from disk if a
/// key path was given
async fn build_credential(config: &Config) -> Result<Credential> {
    let private_key = match &config.key {
        Some(path) => Some(tokio::fs::read_to_string(path).await?),
        None => None,
    };

    let auth = AuthMethod::from_parts(config.password.clone(), private_key)?;

    Ok(Credential::new(&config.host, &config.user, auth).with_port(config.port))
}
