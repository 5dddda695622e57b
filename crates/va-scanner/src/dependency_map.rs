//! Dependency Map: best-effort parsing of `package.json`,
//! `requirements*.txt`, and `pyproject.toml`. Any file that is missing or
//! fails to parse simply contributes nothing — this is a summary, not a
//! build-correctness check.

use std::collections::HashMap;

use serde_json::Value;
use va_core::index::Dependencies;
use va_sandbox::Sandbox;

pub fn build(sandbox: &Sandbox) -> Dependencies {
    let mut deps = Dependencies::default();
    merge_package_json(sandbox, &mut deps);
    merge_requirements(sandbox, "requirements.txt", false, &mut deps);
    merge_requirements(sandbox, "requirements-dev.txt", true, &mut deps);
    merge_pyproject(sandbox, &mut deps);
    deps
}

fn merge_package_json(sandbox: &Sandbox, deps: &mut Dependencies) {
    let Ok(path) = sandbox.resolve("package.json") else {
        return;
    };
    let Ok(content) = std::fs::read_to_string(&path) else {
        return;
    };
    let Ok(value) = serde_json::from_str::<Value>(&content) else {
        return;
    };

    if let Some(map) = value.get("dependencies").and_then(Value::as_object) {
        for (name, version) in map {
            deps.node
                .insert(name.clone(), version.as_str().unwrap_or("unspecified").to_string());
        }
    }
    if let Some(map) = value.get("devDependencies").and_then(Value::as_object) {
        for (name, version) in map {
            deps.node_dev
                .insert(name.clone(), version.as_str().unwrap_or("unspecified").to_string());
        }
    }
}

fn merge_requirements(sandbox: &Sandbox, filename: &str, is_dev: bool, deps: &mut Dependencies) {
    let Ok(path) = sandbox.resolve(filename) else {
        return;
    };
    let Ok(content) = std::fs::read_to_string(&path) else {
        return;
    };

    let mut entries: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            continue;
        }
        let (name, version) = split_requirement(line);
        entries.insert(name, version);
    }
    if is_dev {
        deps.python_dev.extend(entries);
    } else {
        deps.python.extend(entries);
    }
}

/// `requests==2.31.0` -> `("requests", "2.31.0")`; `click>=8` -> `("click",
/// ">=8")`; a bare name gets `"unspecified"`.
fn split_requirement(line: &str) -> (String, String) {
    let line = line.split(';').next().unwrap_or(line).trim();
    for sep in ["===", "==", ">=", "<=", "~=", "!=", ">", "<"] {
        if let Some(idx) = line.find(sep) {
            let name = line[..idx].trim().to_string();
            let version = line[idx..].trim().to_string();
            return (name, version);
        }
    }
    (line.trim().to_string(), "unspecified".to_string())
}

fn merge_pyproject(sandbox: &Sandbox, deps: &mut Dependencies) {
    let Ok(path) = sandbox.resolve("pyproject.toml") else {
        return;
    };
    let Ok(content) = std::fs::read_to_string(&path) else {
        return;
    };
    let Ok(value) = content.parse::<toml::Value>() else {
        return;
    };

    // PEP 621: [project].dependencies is an array of requirement strings.
    if let Some(list) = value
        .get("project")
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_array())
    {
        for entry in list {
            if let Some(spec) = entry.as_str() {
                let (name, version) = split_requirement(spec);
                deps.python.insert(name, version);
            }
        }
    }
    if let Some(table) = value
        .get("project")
        .and_then(|p| p.get("optional-dependencies"))
        .and_then(|d| d.as_table())
    {
        for list in table.values() {
            if let Some(list) = list.as_array() {
                for entry in list {
                    if let Some(spec) = entry.as_str() {
                        let (name, version) = split_requirement(spec);
                        deps.python_dev.insert(name, version);
                    }
                }
            }
        }
    }

    // Poetry: [tool.poetry.dependencies], excluding the implicit "python" key.
    if let Some(table) = value
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("dependencies"))
        .and_then(|d| d.as_table())
    {
        for (name, spec) in table {
            if name == "python" {
                continue;
            }
            deps.python.insert(name.clone(), poetry_version(spec));
        }
    }
    if let Some(table) = value
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("group"))
        .and_then(|g| g.get("dev"))
        .and_then(|d| d.get("dependencies"))
        .and_then(|d| d.as_table())
    {
        for (name, spec) in table {
            deps.python_dev.insert(name.clone(), poetry_version(spec));
        }
    }
}

fn poetry_version(spec: &toml::Value) -> String {
    match spec {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(t) => t
            .get("version")
            .and_then(|v| v.as_str())
            .unwrap_or("unspecified")
            .to_string(),
        _ => "unspecified".to_string(),
    }
}
