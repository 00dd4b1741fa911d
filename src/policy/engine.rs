//! Command policy engine
//!
//! Decides whether a raw command string may execute and produces the
//! sanitized form that is the only thing ever sent over the wire.

use regex::Regex;

use super::rules::PolicyRules;
use crate::error::{GatewayError, Result};

/// Shell metacharacters deleted by [`CommandPolicy::sanitize`].
const STRIPPED_CHARS: &[char] = &[';', '&', '|', '`', '$', '<', '>'];

/// A command string after metacharacter stripping and whitespace
/// normalization.
///
/// Constructed only by [`CommandPolicy::sanitize`], so holding one is proof
/// the string contains none of `; & | \` $ < >`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedCommand(String);

impl SanitizedCommand {
    /// The sanitized command text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SanitizedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The verdict for one raw command. Produced once, never revised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    /// Whether the command may execute
    pub allowed: bool,

    /// Human-readable rejection reason (None when allowed)
    pub reason: Option<String>,
}

impl PolicyDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Command policy engine.
///
/// Compiled from a [`PolicyRules`] table at construction; evaluation is
/// pure and allocation-light. The decision order is blocklist, then
/// dangerous-pattern scan, then allow-prefix match, and ties always resolve
/// to rejection. The allow list only inspects the leading verb, not its
/// arguments, so this is defense-in-depth in front of the transport, not a
/// complete sandbox.
#[derive(Debug)]
pub struct CommandPolicy {
    blocked_terms: Vec<String>,
    dangerous_patterns: Vec<Regex>,
    allowed_prefixes: Vec<String>,
}

impl CommandPolicy {
    /// Compile a policy from a rule table.
    ///
    /// Fails with a `Config` error if any dangerous-pattern entry is not a
    /// valid regular expression, so a bad table is caught at startup rather
    /// than at evaluation time.
    pub fn new(rules: &PolicyRules) -> Result<Self> {
        let dangerous_patterns = rules
            .dangerous_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    GatewayError::config(format!("invalid dangerous pattern '{}': {}", pattern, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            blocked_terms: rules.blocked_terms.iter().map(|t| t.to_lowercase()).collect(),
            dangerous_patterns,
            allowed_prefixes: rules
                .allowed_prefixes
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        })
    }

    /// Sanitize a raw command.
    ///
    /// Deletes every occurrence of `; & | \` $ < >`, then collapses
    /// whitespace runs to a single space and trims the ends. Deleting
    /// before collapsing keeps the function idempotent: a metacharacter
    /// that stood alone between spaces does not leave a double space
    /// behind.
    ///
    /// # Examples
    /// ```
    /// use ssh_gateway::policy::{CommandPolicy, PolicyRules};
    ///
    /// let policy = CommandPolicy::new(&PolicyRules::default()).unwrap();
    /// let cmd = policy.sanitize("cat /etc/passwd; rm -rf /");
    /// assert_eq!(cmd.as_str(), "cat /etc/passwd rm -rf /");
    /// ```
    pub fn sanitize(&self, raw: &str) -> SanitizedCommand {
        let stripped: String = raw
            .chars()
            .filter(|c| !STRIPPED_CHARS.contains(c))
            .collect();
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        SanitizedCommand(collapsed)
    }

    /// Evaluate a raw command. Sanitizes first, then applies the rule
    /// tables to the sanitized, lower-cased form.
    pub fn evaluate(&self, raw: &str) -> PolicyDecision {
        self.evaluate_sanitized(&self.sanitize(raw))
    }

    /// Evaluate an already-sanitized command.
    pub fn evaluate_sanitized(&self, command: &SanitizedCommand) -> PolicyDecision {
        let lowered = command.as_str().to_lowercase();

        if lowered.is_empty() {
            return PolicyDecision::deny("command is empty");
        }

        // Blocklist has priority over everything, including the allow list
        for term in &self.blocked_terms {
            if lowered.contains(term.as_str()) {
                return PolicyDecision::deny(format!("contains blocked term '{}'", term));
            }
        }

        for pattern in &self.dangerous_patterns {
            if pattern.is_match(&lowered) {
                return PolicyDecision::deny(format!(
                    "matches dangerous pattern '{}'",
                    pattern.as_str()
                ));
            }
        }

        // Allow-list-terminated: unknown commands are rejected by default
        if self
            .allowed_prefixes
            .iter()
            .any(|prefix| lowered.starts_with(prefix.as_str()))
        {
            PolicyDecision::allow()
        } else {
            PolicyDecision::deny("does not match any allowed command prefix")
        }
    }
}
