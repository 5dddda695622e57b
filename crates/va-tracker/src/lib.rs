//! Change Tracker: per-task, whole-file before/after byte snapshots
//! enabling a full-session rollback, specialized to plain file bytes
//! rather than git-level checkpoints — a task's rollback target is "the
//! workspace before this session touched it", not a commit.

use std::collections::HashMap;
use std::fs;

use va_sandbox::Sandbox;

struct Snapshot {
    existed_before: bool,
    before: Vec<u8>,
    after: Vec<u8>,
}

#[derive(Default)]
pub struct ChangeTracker {
    order: Vec<String>,
    snapshots: HashMap<String, Snapshot>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// First observation wins: a later call for the same path is a no-op,
    /// so rollback always restores the pre-session state.
    pub fn record_before(&mut self, path: &str, existed: bool, before_bytes: Vec<u8>) {
        if self.snapshots.contains_key(path) {
            return;
        }
        self.order.push(path.to_string());
        self.snapshots.insert(
            path.to_string(),
            Snapshot {
                existed_before: existed,
                after: before_bytes.clone(),
                before: before_bytes,
            },
        );
    }

    /// Update the tracked post-write state. A no-op for a path with no
    /// prior `record_before` call.
    pub fn record_after(&mut self, path: &str, after_bytes: Vec<u8>) {
        if let Some(snapshot) = self.snapshots.get_mut(path) {
            snapshot.after = after_bytes;
        }
    }

    pub fn has_changes(&self) -> bool {
        self.snapshots.values().any(|s| s.before != s.after)
    }

    pub fn tracked_paths(&self) -> &[String] {
        &self.order
    }

    /// Before/after text for every path whose snapshot actually changed,
    /// in first-touched order, for the end-of-task diff summary. Binary
    /// content (not valid UTF-8) is skipped rather than rendered as a diff.
    pub fn changed_files(&self) -> Vec<(String, String, String)> {
        self.order
            .iter()
            .filter_map(|path| {
                let snapshot = self.snapshots.get(path)?;
                if snapshot.before == snapshot.after {
                    return None;
                }
                let before = String::from_utf8(snapshot.before.clone()).ok()?;
                let after = String::from_utf8(snapshot.after.clone()).ok()?;
                Some((path.clone(), before, after))
            })
            .collect()
    }

    /// Restore every tracked path to its pre-session state, processing in
    /// reverse insertion order (latest-touched first) and returning the
    /// restored paths re-reversed back to chronological order.
    pub fn rollback(&self, sandbox: &Sandbox) -> Result<Vec<String>, String> {
        let mut restored = Vec::new();
        for path in self.order.iter().rev() {
            let Some(snapshot) = self.snapshots.get(path) else {
                continue;
            };
            let resolved = sandbox
                .resolve(path)
                .map_err(|e| format!("{path} is outside workspace root: {e}"))?;

            if snapshot.existed_before {
                if let Some(parent) = resolved.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|e| format!("failed to create dirs for {path}: {e}"))?;
                }
                fs::write(&resolved, &snapshot.before)
                    .map_err(|e| format!("failed to restore {path}: {e}"))?;
            } else if resolved.exists() {
                fs::remove_file(&resolved).map_err(|e| format!("failed to delete {path}: {e}"))?;
            }
            restored.push(path.clone());
        }
        restored.reverse();
        Ok(restored)
    }
}
