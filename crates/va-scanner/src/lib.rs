//! Project Scanner: builds, caches, and persists the
//! project index. Scans are idempotent and memoized; concurrent callers
//! serialize on the scanner's lock, which gives the single-in-flight-scan
//! behavior the project demands without modeling a separate shared-future
//! type — the lock itself is the single-writer discipline applied across
//! the persistent stores here.

mod dependency_map;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use va_core::index::{Dependencies, FileEntry, Language, ProjectIndex};
use va_fs::ListOptions;
use va_sandbox::Sandbox;

const MAX_PARSE_SIZE_BYTES: u64 = 1_000_000;

pub struct ProjectScanner {
    sandbox: Sandbox,
    index_path: PathBuf,
    max_files: usize,
    cache: Mutex<Option<Arc<ProjectIndex>>>,
}

impl ProjectScanner {
    pub fn new(sandbox: Sandbox, state_dir: &Path, max_files: usize) -> Self {
        Self {
            sandbox,
            index_path: state_dir.join("index").join("project-index.json"),
            max_files,
            cache: Mutex::new(None),
        }
    }

    /// Build (or reuse) the project index. `refresh = true` invalidates
    /// the cache unconditionally.
    pub async fn scan(&self, refresh: bool) -> Arc<ProjectIndex> {
        let mut guard = self.cache.lock().await;
        if !refresh {
            if let Some(cached) = guard.as_ref() {
                return cached.clone();
            }
        }
        let built = Arc::new(self.build_index());
        if let Err(e) = self.persist(&built) {
            tracing::warn!(error = %e, "failed to persist project index");
        }
        *guard = Some(built.clone());
        built
    }

    /// Condensed human-readable summary of the current index, scanning
    /// first if nothing is cached yet.
    pub async fn summary(&self) -> String {
        let idx = self.scan(false).await;
        let langs: Vec<String> = idx
            .languages
            .iter()
            .map(|(lang, count)| format!("{lang}: {count}"))
            .collect();
        format!(
            "{} files scanned ({})",
            idx.total_files_scanned,
            langs.join(", ")
        )
    }

    /// Symbol lookup: lowercased substring match, exact
    /// case-folded matches first, then substring matches preserving index
    /// order.
    pub async fn lookup_symbols(
        &self,
        query: &str,
        language: Option<Language>,
        limit: Option<usize>,
    ) -> Vec<va_core::index::Symbol> {
        let idx = self.scan(false).await;
        let limit = limit.unwrap_or(80).min(2000);
        let needle = query.to_lowercase();

        let filtered: Vec<&va_core::index::Symbol> = idx
            .symbols
            .iter()
            .filter(|s| language.is_none_or(|l| s.language == l))
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect();

        let mut exact = Vec::new();
        let mut substring = Vec::new();
        for s in filtered {
            if s.name.to_lowercase() == needle {
                exact.push(s.clone());
            } else {
                substring.push(s.clone());
            }
        }
        exact.extend(substring);
        exact.truncate(limit);
        exact
    }

    /// Reference lookup: exact-equality match against the
    /// `uses` list.
    pub async fn find_references(
        &self,
        name: &str,
        language: Option<Language>,
        limit: Option<usize>,
    ) -> Vec<va_core::index::Use> {
        let idx = self.scan(false).await;
        let limit = limit.unwrap_or(120);
        idx.uses
            .iter()
            .filter(|u| u.name == name)
            .filter(|u| language.is_none_or(|l| u.language == l))
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn dependency_map(&self) -> Dependencies {
        let idx = self.scan(false).await;
        idx.dependencies.clone()
    }

    fn build_index(&self) -> ProjectIndex {
        let opts = ListOptions {
            depth: 16,
            max_entries: self.max_files * 2,
        };
        let entries = va_fs::list(&self.sandbox, ".", &opts).unwrap_or_default();

        let mut files: Vec<String> = entries.into_iter().filter(|e| !e.ends_with('/')).collect();
        files.sort();
        files.truncate(self.max_files);

        let mut file_entries = Vec::new();
        let mut languages: std::collections::HashMap<String, usize> =
            std::collections::HashMap::new();
        let mut symbols = Vec::new();
        let mut imports = Vec::new();
        let mut uses = Vec::new();

        for rel_path in &files {
            let Ok(abs_path) = self.sandbox.resolve(rel_path) else {
                continue;
            };
            let Ok(meta) = std::fs::metadata(&abs_path) else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }

            let language = Language::detect(rel_path);
            *languages.entry(language.as_str().to_string()).or_insert(0) += 1;

            let content = std::fs::read_to_string(&abs_path).unwrap_or_default();
            let line_count = content.lines().count();
            file_entries.push(FileEntry {
                path: rel_path.clone(),
                language,
                size_bytes: meta.len(),
                line_count,
            });

            if meta.len() > MAX_PARSE_SIZE_BYTES || language == Language::Unknown {
                continue;
            }

            let parsed = va_lang::parse(rel_path, language, &content);
            symbols.extend(parsed.symbols);
            imports.extend(parsed.imports);
            uses.extend(parsed.uses);
        }

        let dependencies = dependency_map::build(&self.sandbox);

        ProjectIndex {
            generated_at: chrono::Utc::now().to_rfc3339(),
            workspace_root: self.sandbox.root().to_string_lossy().into_owned(),
            total_files_scanned: file_entries.len(),
            languages,
            files: file_entries,
            symbols,
            imports,
            uses,
            dependencies,
        }
    }

    fn persist(&self, index: &ProjectIndex) -> std::io::Result<()> {
        if let Some(parent) = self.index_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(index)?;
        std::fs::write(&self.index_path, json)
    }
}
