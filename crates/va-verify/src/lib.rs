//! Auto-Verify Discovery: assembles a verify-command list
//! from memory hints, `package.json` scripts, and Python config files,
//! concatenated in priority order, deduped, and truncated to
//! `max_commands`.

use serde_json::Value;
use va_core::memory::ProjectMemory;
use va_sandbox::Sandbox;

const PYTHON_CONFIG_FILES: &[&str] = &["pyproject.toml", "setup.cfg", "tox.ini"];

pub fn discover_verify_commands(
    sandbox: &Sandbox,
    memory: &ProjectMemory,
    max_commands: usize,
) -> Vec<String> {
    let mut commands = Vec::new();

    for entry in &memory.common_commands {
        if let Some(command) = entry.strip_prefix("verify:") {
            commands.push(command.to_string());
        }
    }

    commands.extend(package_json_commands(sandbox));
    commands.extend(python_config_commands(sandbox));

    let mut seen = std::collections::HashSet::new();
    commands.retain(|c| seen.insert(c.clone()));
    commands.truncate(max_commands);
    commands
}

fn package_json_commands(sandbox: &Sandbox) -> Vec<String> {
    let mut out = Vec::new();
    let Ok(path) = sandbox.resolve("package.json") else {
        return out;
    };
    let Ok(content) = std::fs::read_to_string(&path) else {
        return out;
    };
    let Ok(value) = serde_json::from_str::<Value>(&content) else {
        return out;
    };
    let Some(scripts) = value.get("scripts").and_then(Value::as_object) else {
        return out;
    };

    if scripts.contains_key("test") {
        out.push("npm run -s test --if-present".to_string());
    }
    if scripts.contains_key("lint") {
        out.push("npm run -s lint --if-present".to_string());
    }
    if scripts.contains_key("format:check") {
        out.push("npm run -s format:check --if-present".to_string());
    } else if scripts.contains_key("format") {
        out.push("npm run -s format --if-present".to_string());
    }
    if scripts.contains_key("typecheck") {
        out.push("npm run -s typecheck --if-present".to_string());
    }
    if scripts.contains_key("check") {
        out.push("npm run -s check --if-present".to_string());
    }
    out
}

fn python_config_commands(sandbox: &Sandbox) -> Vec<String> {
    let mut combined = String::new();
    for filename in PYTHON_CONFIG_FILES {
        if let Ok(path) = sandbox.resolve(filename) {
            if let Ok(content) = std::fs::read_to_string(&path) {
                combined.push_str(&content);
                combined.push('\n');
            }
        }
    }
    let lower = combined.to_lowercase();

    let mut out = Vec::new();
    if lower.contains("pytest") {
        out.push("pytest -q".to_string());
    }
    if lower.contains("ruff") {
        out.push("ruff check .".to_string());
    }
    if lower.contains("black") {
        out.push("black --check .".to_string());
    }
    if lower.contains("mypy") {
        out.push("mypy .".to_string());
    }
    out
}
