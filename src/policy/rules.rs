//! Policy rule tables.
//!
//! The tables below are the single source of truth for what the gateway will
//! execute. They are kept as data rather than code so they can be audited,
//! versioned, and tested independently of the executor.

use serde::{Deserialize, Serialize};

/// Substrings that reject a command outright, wherever they appear.
///
/// Matched case-insensitively with `contains()` against the sanitized
/// command, so a destructive verb buried mid-pipeline is still caught.
pub const BLOCKED_TERMS: &[&str] = &[
    "rm -rf",
    "rm -fr",
    "rm -r",
    "dd",
    "mkfs",
    "shutdown",
    "reboot",
    "halt",
    "poweroff",
    "init",
    "kill",
    "chmod 777",
];

/// Regex signatures for dangerous command shapes.
///
/// Checked after the blocklist, against the sanitized lower-cased command.
/// The redirection signatures also guard callers that evaluate text which
/// never went through `sanitize`.
pub const DANGEROUS_PATTERNS: &[&str] = &[
    r"rm\s+.*-.*[rf]",          // rm with -r or -f flags
    r":\(\)\{.*;\s*:",          // fork bomb
    r"chmod\s+[0-7]{3,4}\s+.*", // chmod with a 3-4 digit octal mode
    r">\s*/dev/sd[a-z]",        // writing to disk devices
    r"dd\s+.*if=.*of=",         // dd with input and output files
    r"mkfs\s+",                 // format commands
    r">\s*/proc/",              // writing to /proc
];

/// Prefixes a command must start with to be accepted.
///
/// Read-only/introspection verbs plus a handful of explicitly permitted
/// filesystem mutations. Entries with a trailing space require at least one
/// argument. Anything not matching is rejected by default.
pub const ALLOWED_PREFIXES: &[&str] = &[
    "ls", "pwd", "whoami", "date", "uptime", "free", "df", "ps", "cat ", "grep ", "tail ",
    "head ", "wc ", "find ", "du ", "uname", "echo ", "cd ", "mkdir ", "touch ", "cp ", "mv ",
];

/// The full rule set a [`CommandPolicy`](super::CommandPolicy) is built from.
///
/// Serializable so deployments can persist, diff, and review the active
/// policy. `Default` yields the built-in tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRules {
    /// Substrings that reject a command wherever they appear
    pub blocked_terms: Vec<String>,

    /// Regex signatures that reject a command on match
    pub dangerous_patterns: Vec<String>,

    /// Accepted command prefixes (trailing space = argument required)
    pub allowed_prefixes: Vec<String>,
}

impl Default for PolicyRules {
    fn default() -> Self {
        Self {
            blocked_terms: BLOCKED_TERMS.iter().map(|s| s.to_string()).collect(),
            dangerous_patterns: DANGEROUS_PATTERNS.iter().map(|s| s.to_string()).collect(),
            allowed_prefixes: ALLOWED_PREFIXES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_populated() {
        let rules = PolicyRules::default();
        assert_eq!(rules.blocked_terms.len(), BLOCKED_TERMS.len());
        assert_eq!(rules.dangerous_patterns.len(), DANGEROUS_PATTERNS.len());
        assert_eq!(rules.allowed_prefixes.len(), ALLOWED_PREFIXES.len());
    }

    #[test]
    fn test_rules_round_trip_through_json() {
        let rules = PolicyRules::default();
        let json = serde_json::to_string(&rules).unwrap();
        let parsed: PolicyRules = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.blocked_terms, rules.blocked_terms);
        assert_eq!(parsed.dangerous_patterns, rules.dangerous_patterns);
        assert_eq!(parsed.allowed_prefixes, rules.allowed_prefixes);
    }

    #[test]
    fn test_mutation_verbs_are_explicitly_listed() {
        let rules = PolicyRules::default();
        for verb in ["mkdir ", "touch ", "cp ", "mv ", "cd ", "echo "] {
            assert!(rules.allowed_prefixes.iter().any(|p| p == verb));
        }
    }
}
