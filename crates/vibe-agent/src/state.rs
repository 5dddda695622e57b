//! Policy persistence and session-id minting. Memory and the project
//! index own their persistence in `va-memory`/`va-scanner`; Policy is
//! small and read once per task, so it lives here rather than behind its
//! own crate.

use std::path::Path;

use va_core::policy::Policy;

/// Load `<state_dir>/policy.json`; if absent, write the defaults and
/// return them.
pub fn load_or_init_policy(state_dir: &Path) -> Policy {
    let path = state_dir.join("policy.json");
    match std::fs::read_to_string(&path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "policy.json is malformed, using defaults");
            Policy::default()
        }),
        Err(_) => {
            let defaults = Policy::default();
            if let Err(e) = write_policy(state_dir, &defaults) {
                tracing::warn!(error = %e, "failed to persist default policy");
            }
            defaults
        }
    }
}

fn write_policy(state_dir: &Path, policy: &Policy) -> std::io::Result<()> {
    std::fs::create_dir_all(state_dir)?;
    let json = serde_json::to_string_pretty(policy).unwrap_or_default();
    std::fs::write(state_dir.join("policy.json"), json)
}

/// ISO-8601 start timestamp with `:` and `.` replaced by `-`, used both
/// as the session id and the audit file stem.
pub fn new_session_id() -> String {
    chrono::Utc::now()
        .to_rfc3339()
        .replace(':', "-")
        .replace('.', "-")
}
