//! Memory Store: lazily loaded project memory with an authoritative
//! in-memory cache and merge-on-update semantics. Persistence uses an
//! atomic rewrite (temp file + rename, `0o600`/`0o700` permission
//! hardening on unix) over a single evolving whole-document JSON, since
//! project memory has no event history to append to.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;
use va_core::memory::{MemoryUpdates, ProjectMemory, MAX_LIST_ENTRIES};

pub struct MemoryStore {
    path: PathBuf,
    cache: Mutex<Option<ProjectMemory>>,
}

impl MemoryStore {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join("memory.json"),
            cache: Mutex::new(None),
        }
    }

    /// Current memory document, loading from disk on first access.
    pub async fn load(&self) -> ProjectMemory {
        let mut guard = self.cache.lock().await;
        if let Some(mem) = guard.as_ref() {
            return mem.clone();
        }
        let mem = self.read_from_disk().unwrap_or_default();
        *guard = Some(mem.clone());
        mem
    }

    /// Merge `updates` into the document: each list field is a deduplicating
    /// append capped at [`MAX_LIST_ENTRIES`] (oldest entries drop off the
    /// front once the cap is exceeded); KV merges by overwrite. Any change
    /// bumps `updated_at` and rewrites the whole document. Returns the
    /// change tags the orchestrator surfaces to the user, e.g.
    /// `projectRules(+2)`, `kv.style.imports`.
    pub async fn apply_updates(&self, updates: &MemoryUpdates) -> Vec<String> {
        let mut guard = self.cache.lock().await;
        let mut mem = match guard.take() {
            Some(m) => m,
            None => self.read_from_disk().unwrap_or_default(),
        };

        let mut tags = Vec::new();
        let added = dedup_append(&mut mem.project_rules, &updates.project_rules);
        if added > 0 {
            tags.push(format!("projectRules(+{added})"));
        }
        let added = dedup_append(&mut mem.architecture_notes, &updates.architecture_notes);
        if added > 0 {
            tags.push(format!("architectureNotes(+{added})"));
        }
        let added = dedup_append(&mut mem.common_commands, &updates.common_commands);
        if added > 0 {
            tags.push(format!("commonCommands(+{added})"));
        }
        for (key, value) in &updates.kv {
            mem.kv.insert(key.clone(), value.clone());
            tags.push(format!("kv.{key}"));
        }

        if !tags.is_empty() {
            mem.updated_at = chrono::Utc::now().to_rfc3339();
            if let Err(e) = self.persist(&mem) {
                tracing::warn!(error = %e, "failed to persist project memory");
            }
        }

        *guard = Some(mem);
        tags
    }

    fn read_from_disk(&self) -> Option<ProjectMemory> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn persist(&self, mem: &ProjectMemory) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            let existed = parent.exists();
            std::fs::create_dir_all(parent)?;
            if !existed {
                set_dir_mode_700(parent)?;
            }
        }

        let mut tmp_name = self.path.clone().into_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let json = serde_json::to_string_pretty(mem)?;
        std::fs::write(&tmp_path, json)?;
        set_file_mode_600(&tmp_path)?;
        std::fs::rename(&tmp_path, &self.path)
    }
}

fn dedup_append(list: &mut Vec<String>, additions: &[String]) -> usize {
    let mut added = 0;
    for item in additions {
        if !list.contains(item) {
            list.push(item.clone());
            added += 1;
        }
    }
    if list.len() > MAX_LIST_ENTRIES {
        let excess = list.len() - MAX_LIST_ENTRIES;
        list.drain(0..excess);
    }
    added
}

#[cfg(unix)]
fn set_dir_mode_700(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn set_dir_mode_700(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
fn set_file_mode_600(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_file_mode_600(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn updates(rules: &[&str], kv: &[(&str, &str)]) -> MemoryUpdates {
        MemoryUpdates {
            project_rules: rules.iter().map(|s| s.to_string()).collect(),
            architecture_notes: Vec::new(),
            common_commands: Vec::new(),
            kv: kv.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    #[tokio::test]
    async fn load_is_empty_when_no_file_exists() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::new(dir.path());
        let mem = store.load().await;
        assert!(mem.project_rules.is_empty());
    }

    #[tokio::test]
    async fn apply_updates_dedup_appends_and_tags_count() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::new(dir.path());
        let tags = store
            .apply_updates(&updates(&["use 2-space indent", "no any types"], &[]))
            .await;
        assert_eq!(tags, vec!["projectRules(+2)".to_string()]);

        let tags = store
            .apply_updates(&updates(&["use 2-space indent", "prefer const"], &[]))
            .await;
        assert_eq!(tags, vec!["projectRules(+1)".to_string()]);

        let mem = store.load().await;
        assert_eq!(mem.project_rules.len(), 3);
    }

    #[tokio::test]
    async fn apply_updates_merges_kv_by_overwrite() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::new(dir.path());
        store
            .apply_updates(&updates(&[], &[("style.imports", "absolute")]))
            .await;
        let tags = store
            .apply_updates(&updates(&[], &[("style.imports", "relative")]))
            .await;
        assert_eq!(tags, vec!["kv.style.imports".to_string()]);

        let mem = store.load().await;
        assert_eq!(mem.kv.get("style.imports"), Some(&"relative".to_string()));
    }

    #[tokio::test]
    async fn empty_updates_produce_no_tags_and_no_write() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::new(dir.path());
        let tags = store.apply_updates(&MemoryUpdates::default()).await;
        assert!(tags.is_empty());
        assert!(!dir.path().join("memory.json").exists());
    }

    #[tokio::test]
    async fn list_caps_at_max_entries_dropping_oldest() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::new(dir.path());
        let many: Vec<String> = (0..(MAX_LIST_ENTRIES + 10))
            .map(|i| format!("rule-{i}"))
            .collect();
        store
            .apply_updates(&MemoryUpdates {
                project_rules: many,
                architecture_notes: Vec::new(),
                common_commands: Vec::new(),
                kv: HashMap::new(),
            })
            .await;
        let mem = store.load().await;
        assert_eq!(mem.project_rules.len(), MAX_LIST_ENTRIES);
        assert_eq!(mem.project_rules[0], "rule-10");
    }

    #[tokio::test]
    async fn persists_across_new_store_instances() {
        let dir = tempdir().unwrap();
        {
            let store = MemoryStore::new(dir.path());
            store
                .apply_updates(&updates(&["rule-a"], &[]))
                .await;
        }
        let store2 = MemoryStore::new(dir.path());
        let mem = store2.load().await;
        assert_eq!(mem.project_rules, vec!["rule-a".to_string()]);
    }
}
