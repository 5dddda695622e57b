//! Policy: command allow/deny, write-path globs, secret detection
//! toggle. Enforcement logic lives in `va-policy`; this module owns the
//! persisted shape and its defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default = "default_true")]
    pub allow_run_command: bool,
    #[serde(default = "default_true")]
    pub allow_write: bool,
    #[serde(default)]
    pub allowed_command_prefixes: Vec<String>,
    #[serde(default = "default_blocked_command_patterns")]
    pub blocked_command_patterns: Vec<String>,
    #[serde(default = "default_blocked_write_globs")]
    pub blocked_write_globs: Vec<String>,
    #[serde(default)]
    pub allow_potential_secrets: bool,
}

fn default_true() -> bool {
    true
}

/// Default patterns a command is checked against before it runs.
pub fn default_blocked_command_patterns() -> Vec<String> {
    vec![
        r"rm\s+-rf\s+/".to_string(),
        r"del\s+/s\s+/q\s+c:\\".to_string(),
        r"shutdown".to_string(),
        r"reboot".to_string(),
        r"mkfs".to_string(),
        r"format\s+[a-z]:".to_string(),
        r"curl.*\|\s*sh".to_string(),
        r"wget.*\|\s*sh".to_string(),
        r"powershell\s+-enc".to_string(),
    ]
}

/// Default globs a write path is checked against before it's applied.
pub fn default_blocked_write_globs() -> Vec<String> {
    vec![
        ".env".to_string(),
        ".env.*".to_string(),
        "**/.env".to_string(),
        "**/.env.*".to_string(),
        "**/*.pem".to_string(),
        "**/*.key".to_string(),
        "**/id_rsa".to_string(),
        ".git/**".to_string(),
    ]
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            allow_run_command: true,
            allow_write: true,
            allowed_command_prefixes: Vec::new(),
            blocked_command_patterns: default_blocked_command_patterns(),
            blocked_write_globs: default_blocked_write_globs(),
            allow_potential_secrets: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_allows_by_default() {
        let p = Policy::default();
        assert!(p.allow_run_command);
        assert!(p.allow_write);
        assert!(!p.allow_potential_secrets);
    }

    #[test]
    fn default_blocked_patterns_include_rm_rf_root() {
        let p = Policy::default();
        assert!(p.blocked_command_patterns.iter().any(|p| p.contains("rm")));
    }

    #[test]
    fn serde_roundtrip_defaults() {
        let p = Policy::default();
        let json = serde_json::to_string(&p).unwrap();
        let back: Policy = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn absent_fields_fall_back_to_defaults_on_deserialize() {
        let p: Policy = serde_json::from_str("{}").unwrap();
        assert_eq!(p, Policy::default());
    }
}
