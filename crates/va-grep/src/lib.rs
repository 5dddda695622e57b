//! Grep Engine: ripgrep-preferred text search with a walker-equivalent
//! fallback over the File Toolkit. Ripgrep detection is a one-time
//! cached probe behind a `OnceLock`.

use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use va_fs::{ListOptions, list};
use va_sandbox::Sandbox;

const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "zip", "tar", "gz", "bz2", "7z", "rar",
    "exe", "dll", "so", "dylib", "bin", "mp3", "mp4", "mov", "avi", "pdf", "woff", "woff2", "ttf",
    "eot",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrepMatch {
    pub path: String,
    pub line: usize,
    pub text: String,
}

static RIPGREP_PRESENT: OnceLock<bool> = OnceLock::new();

fn ripgrep_present() -> bool {
    *RIPGREP_PRESENT.get_or_init(probe_ripgrep)
}

fn probe_ripgrep() -> bool {
    which::which("rg").is_ok()
        && Command::new("rg")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
}

/// Search `path` (relative to the sandbox) for `pattern`, capped at
/// `max_matches`.
pub fn grep(
    sandbox: &Sandbox,
    pattern: &str,
    path: &str,
    max_matches: usize,
) -> Result<Vec<GrepMatch>, String> {
    let root = sandbox
        .resolve(path)
        .map_err(|e| format!("{path} is outside workspace root: {e}"))?;

    if ripgrep_present() {
        match run_ripgrep(sandbox, pattern, &root, max_matches) {
            Ok(matches) => return Ok(matches),
            Err(e) => {
                tracing::warn!(error = %e, "ripgrep invocation failed, falling back to walker");
            }
        }
    }
    Ok(walker_fallback(sandbox, pattern, &root, max_matches))
}

fn run_ripgrep(
    sandbox: &Sandbox,
    pattern: &str,
    root: &Path,
    max_matches: usize,
) -> Result<Vec<GrepMatch>, String> {
    let output = Command::new("rg")
        .args(["--json", "-n", pattern])
        .arg(root)
        .output()
        .map_err(|e| format!("failed to spawn rg: {e}"))?;

    // Exit codes 0 (matches found) and 1 (no matches) are both non-error.
    if !output.status.success() && output.status.code() != Some(1) {
        return Err(format!(
            "rg exited with {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut matches = Vec::new();
    for line in stdout.lines() {
        if matches.len() >= max_matches {
            break;
        }
        let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
            continue;
        };
        if value.get("type").and_then(|t| t.as_str()) != Some("match") {
            continue;
        }
        let data = &value["data"];
        let abs_path = data["path"]["text"].as_str().unwrap_or_default();
        let line_number = data["line_number"].as_u64().unwrap_or(0) as usize;
        let text = data["lines"]["text"].as_str().unwrap_or_default().trim_end();
        matches.push(GrepMatch {
            path: sandbox.to_relative(Path::new(abs_path)),
            line: line_number,
            text: text.to_string(),
        });
    }
    Ok(matches)
}

fn walker_fallback(sandbox: &Sandbox, pattern: &str, root: &Path, max_matches: usize) -> Vec<GrepMatch> {
    let matcher = PatternMatcher::compile(pattern);
    let rel_root = sandbox.to_relative(root);
    let list_root = if rel_root.is_empty() { "." } else { &rel_root };
    let opts = ListOptions {
        depth: 32,
        max_entries: 100_000,
    };
    let Ok(entries) = list(sandbox, list_root, &opts) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for entry in entries {
        if out.len() >= max_matches {
            break;
        }
        if entry.ends_with('/') || is_binary_like(&entry) {
            continue;
        }
        let Ok(resolved) = sandbox.resolve(&entry) else {
            continue;
        };
        let Ok(content) = std::fs::read_to_string(&resolved) else {
            continue;
        };
        for (idx, line) in content.lines().enumerate() {
            if out.len() >= max_matches {
                break;
            }
            if matcher.is_match(line) {
                out.push(GrepMatch {
                    path: entry.clone(),
                    line: idx + 1,
                    text: line.to_string(),
                });
            }
        }
    }
    out
}

fn is_binary_like(path: &str) -> bool {
    let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    BINARY_EXTENSIONS.contains(&ext.as_str())
}

/// Compiles `pattern` as a regex; on compile failure, degrades to a
/// case-insensitive substring test.
enum PatternMatcher {
    Regex(regex::Regex),
    Substring(String),
}

impl PatternMatcher {
    fn compile(pattern: &str) -> Self {
        match RegexBuilder::new(pattern).build() {
            Ok(re) => Self::Regex(re),
            Err(_) => Self::Substring(pattern.to_ascii_lowercase()),
        }
    }

    fn is_match(&self, line: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(line),
            Self::Substring(needle) => line.to_ascii_lowercase().contains(needle.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sandbox_in(dir: &Path) -> Sandbox {
        Sandbox::new(dir.to_path_buf())
    }

    #[test]
    fn walker_fallback_finds_matches() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "hello world\nfoo bar").unwrap();
        let sb = sandbox_in(dir.path());
        let root = sb.resolve(".").unwrap();
        let matches = walker_fallback(&sb, "world", &root, 100);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, "a.txt");
        assert_eq!(matches[0].line, 1);
    }

    #[test]
    fn walker_fallback_skips_binary_extensions() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("image.png"), "world").unwrap();
        fs::write(dir.path().join("a.txt"), "world").unwrap();
        let sb = sandbox_in(dir.path());
        let root = sb.resolve(".").unwrap();
        let matches = walker_fallback(&sb, "world", &root, 100);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, "a.txt");
    }

    #[test]
    fn walker_fallback_respects_max_matches() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "x\nx\nx\nx").unwrap();
        let sb = sandbox_in(dir.path());
        let root = sb.resolve(".").unwrap();
        let matches = walker_fallback(&sb, "x", &root, 2);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn pattern_matcher_degrades_on_invalid_regex() {
        let matcher = PatternMatcher::compile("[invalid(");
        assert!(matcher.is_match("has [invalid( in it"));
        assert!(!matcher.is_match("nothing here"));
    }

    #[test]
    fn pattern_matcher_uses_regex_when_valid() {
        let matcher = PatternMatcher::compile(r"^foo\d+$");
        assert!(matcher.is_match("foo123"));
        assert!(!matcher.is_match("bar123"));
    }

    #[test]
    fn grep_rejects_path_outside_root() {
        let dir = tempdir().unwrap();
        let sb = sandbox_in(dir.path());
        assert!(grep(&sb, "x", "../", 10).is_err());
    }
}
