//! Project Memory: persisted project rules/notes/commands/KV.
//! Merge logic lives in `va-memory`; this module owns the wire shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const MAX_LIST_ENTRIES: usize = 200;
pub const MAX_KV_BATCH: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMemory {
    #[serde(default)]
    pub project_rules: Vec<String>,
    #[serde(default)]
    pub architecture_notes: Vec<String>,
    #[serde(default)]
    pub common_commands: Vec<String>,
    #[serde(default)]
    pub kv: HashMap<String, String>,
    #[serde(default)]
    pub updated_at: String,
}

/// A batch of updates the model may request via `memory_updates`,
/// either through the `memory_set`/`memory_get` actions or the
/// per-iteration `memory_updates` field of a model response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUpdates {
    #[serde(default)]
    pub project_rules: Vec<String>,
    #[serde(default)]
    pub architecture_notes: Vec<String>,
    #[serde(default)]
    pub common_commands: Vec<String>,
    #[serde(default)]
    pub kv: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_memory_is_empty() {
        let mem = ProjectMemory::default();
        assert!(mem.project_rules.is_empty());
        assert!(mem.kv.is_empty());
    }

    #[test]
    fn serde_roundtrip() {
        let mut mem = ProjectMemory::default();
        mem.project_rules.push("use 2-space indent".into());
        mem.kv.insert("style.imports".into(), "absolute".into());
        let json = serde_json::to_string(&mem).unwrap();
        let back: ProjectMemory = serde_json::from_str(&json).unwrap();
        assert_eq!(mem, back);
    }
}
