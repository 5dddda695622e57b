//! Runtime Configuration: immutable for a session, built once from
//! environment variables, with sensible defaults when they're unset.

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MAX_ITERATIONS: u32 = 6;
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_TOOL_OUTPUT_CHARS: usize = 18_000;
const DEFAULT_MAX_SCAN_FILES: usize = 6_000;
const DEFAULT_AUTO_REPAIR_ROUNDS: u32 = 3;
const DEFAULT_STATE_DIR_NAME: &str = ".vibe-agent";

/// Immutable per-session configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub workspace_root: PathBuf,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub max_iterations: u32,
    pub tool_timeout: Duration,
    pub max_tool_output_chars: usize,
    pub max_scan_files: usize,
    pub max_auto_repair_rounds: u32,
    pub auto_verify: bool,
    pub state_dir: PathBuf,
}

impl RuntimeConfig {
    /// Build configuration from environment variables, with
    /// `workspace_root` supplied by the caller (normally the CLI's cwd).
    pub fn from_env(workspace_root: PathBuf) -> Self {
        let api_key = first_env(&["VIBE_API_KEY", "GROQ_API_KEY", "OPENAI_API_KEY"]);
        let base_url = first_env(&["VIBE_BASE_URL", "GROQ_BASE_URL"])
            .unwrap_or_else(|| "https://api.groq.com/openai/v1".to_string());
        let model = first_env(&["VIBE_MODEL", "GROQ_MODEL"])
            .unwrap_or_else(|| "llama-3.3-70b-versatile".to_string());

        let max_iterations = env_u32("VIBE_MAX_ITERATIONS", DEFAULT_MAX_ITERATIONS);
        let tool_timeout_secs = env_u64("VIBE_TOOL_TIMEOUT_MS", DEFAULT_TOOL_TIMEOUT_SECS * 1000);
        let max_tool_output_chars =
            env_usize("VIBE_MAX_TOOL_OUTPUT_CHARS", DEFAULT_MAX_TOOL_OUTPUT_CHARS);
        let max_scan_files = env_usize("VIBE_MAX_SCAN_FILES", DEFAULT_MAX_SCAN_FILES);
        let max_auto_repair_rounds =
            env_u32("VIBE_AUTO_REPAIR_ROUNDS", DEFAULT_AUTO_REPAIR_ROUNDS);
        let auto_verify = std::env::var("VIBE_AUTO_VERIFY")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(true);
        let state_dir = std::env::var("VIBE_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| workspace_root.join(DEFAULT_STATE_DIR_NAME));

        Self {
            workspace_root,
            api_key,
            model,
            base_url,
            max_iterations,
            tool_timeout: Duration::from_millis(tool_timeout_secs),
            max_tool_output_chars,
            max_scan_files,
            max_auto_repair_rounds,
            auto_verify,
            state_dir,
        }
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|n| std::env::var(n).ok())
}

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_vibe_env() {
        for key in [
            "VIBE_API_KEY",
            "GROQ_API_KEY",
            "OPENAI_API_KEY",
            "VIBE_BASE_URL",
            "GROQ_BASE_URL",
            "VIBE_MODEL",
            "GROQ_MODEL",
            "VIBE_MAX_ITERATIONS",
            "VIBE_TOOL_TIMEOUT_MS",
            "VIBE_MAX_TOOL_OUTPUT_CHARS",
            "VIBE_MAX_SCAN_FILES",
            "VIBE_AUTO_REPAIR_ROUNDS",
            "VIBE_AUTO_VERIFY",
            "VIBE_STATE_DIR",
        ] {
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    fn defaults_are_applied() {
        let _g = ENV_LOCK.lock().unwrap();
        clear_vibe_env();
        let cfg = RuntimeConfig::from_env(PathBuf::from("/workspace"));
        assert_eq!(cfg.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(cfg.tool_timeout, Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS));
        assert_eq!(cfg.max_tool_output_chars, DEFAULT_MAX_TOOL_OUTPUT_CHARS);
        assert_eq!(cfg.max_scan_files, DEFAULT_MAX_SCAN_FILES);
        assert_eq!(cfg.max_auto_repair_rounds, DEFAULT_AUTO_REPAIR_ROUNDS);
        assert!(cfg.auto_verify);
        assert_eq!(cfg.state_dir, PathBuf::from("/workspace/.vibe-agent"));
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn api_key_prefers_vibe_over_others() {
        let _g = ENV_LOCK.lock().unwrap();
        clear_vibe_env();
        unsafe {
            std::env::set_var("OPENAI_API_KEY", "sk-openai");
            std::env::set_var("VIBE_API_KEY", "vibe-key");
        }
        let cfg = RuntimeConfig::from_env(PathBuf::from("/workspace"));
        assert_eq!(cfg.api_key.as_deref(), Some("vibe-key"));
        clear_vibe_env();
    }

    #[test]
    fn explicit_state_dir_overrides_default() {
        let _g = ENV_LOCK.lock().unwrap();
        clear_vibe_env();
        unsafe { std::env::set_var("VIBE_STATE_DIR", "/tmp/custom-state") };
        let cfg = RuntimeConfig::from_env(PathBuf::from("/workspace"));
        assert_eq!(cfg.state_dir, PathBuf::from("/tmp/custom-state"));
        clear_vibe_env();
    }
}
