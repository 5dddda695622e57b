//! Project Index: the persisted shape produced by the
//! Project Scanner (`va-scanner`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Typescript,
    Javascript,
    Python,
    Unknown,
}

impl Language {
    pub fn detect(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".ts") || lower.ends_with(".tsx") {
            Self::Typescript
        } else if lower.ends_with(".js")
            || lower.ends_with(".jsx")
            || lower.ends_with(".mjs")
            || lower.ends_with(".cjs")
        {
            Self::Javascript
        } else if lower.ends_with(".py") {
            Self::Python
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Typescript => "typescript",
            Self::Javascript => "javascript",
            Self::Python => "python",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Interface,
    Type,
    Enum,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub language: Language,
    pub size_bytes: u64,
    pub line_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub path: String,
    pub line: usize,
    pub language: Language,
    pub exported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub path: String,
    pub line: usize,
    pub language: Language,
    pub source: String,
    pub imported: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Use {
    pub name: String,
    pub path: String,
    pub line: usize,
    pub language: Language,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    pub node: HashMap<String, String>,
    pub node_dev: HashMap<String, String>,
    pub python: HashMap<String, String>,
    pub python_dev: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectIndex {
    pub generated_at: String,
    pub workspace_root: String,
    pub total_files_scanned: usize,
    pub languages: HashMap<String, usize>,
    pub files: Vec<FileEntry>,
    pub symbols: Vec<Symbol>,
    pub imports: Vec<Import>,
    pub uses: Vec<Use>,
    pub dependencies: Dependencies,
}

impl ProjectIndex {
    /// Checks the two cross-cutting invariants: every symbol/import/use
    /// path appears in `files`, and language tallies sum to
    /// `total_files_scanned`.
    pub fn check_invariants(&self) -> Result<(), String> {
        let known: std::collections::HashSet<&str> =
            self.files.iter().map(|f| f.path.as_str()).collect();
        for s in &self.symbols {
            if !known.contains(s.path.as_str()) {
                return Err(format!("symbol path {} not in files", s.path));
            }
        }
        for i in &self.imports {
            if !known.contains(i.path.as_str()) {
                return Err(format!("import path {} not in files", i.path));
            }
        }
        for u in &self.uses {
            if !known.contains(u.path.as_str()) {
                return Err(format!("use path {} not in files", u.path));
            }
        }
        let sum: usize = self.languages.values().sum();
        if sum != self.total_files_scanned {
            return Err(format!(
                "language tallies sum to {sum}, expected {}",
                self.total_files_scanned
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_language_by_extension() {
        assert_eq!(Language::detect("src/a.ts"), Language::Typescript);
        assert_eq!(Language::detect("src/a.tsx"), Language::Typescript);
        assert_eq!(Language::detect("src/a.js"), Language::Javascript);
        assert_eq!(Language::detect("src/a.py"), Language::Python);
        assert_eq!(Language::detect("README.md"), Language::Unknown);
    }

    #[test]
    fn invariants_hold_for_consistent_index() {
        let idx = ProjectIndex {
            generated_at: "now".into(),
            workspace_root: "/ws".into(),
            total_files_scanned: 1,
            languages: HashMap::from([("typescript".to_string(), 1)]),
            files: vec![FileEntry {
                path: "a.ts".into(),
                language: Language::Typescript,
                size_bytes: 10,
                line_count: 1,
            }],
            symbols: vec![Symbol {
                name: "foo".into(),
                kind: SymbolKind::Function,
                path: "a.ts".into(),
                line: 1,
                language: Language::Typescript,
                exported: true,
            }],
            imports: vec![],
            uses: vec![],
            dependencies: Dependencies::default(),
        };
        assert!(idx.check_invariants().is_ok());
    }

    #[test]
    fn invariants_fail_for_orphan_symbol_path() {
        let mut idx = ProjectIndex {
            generated_at: "now".into(),
            workspace_root: "/ws".into(),
            total_files_scanned: 0,
            languages: HashMap::new(),
            files: vec![],
            symbols: vec![],
            imports: vec![],
            uses: vec![],
            dependencies: Dependencies::default(),
        };
        idx.symbols.push(Symbol {
            name: "foo".into(),
            kind: SymbolKind::Function,
            path: "missing.ts".into(),
            line: 1,
            language: Language::Typescript,
            exported: false,
        });
        assert!(idx.check_invariants().is_err());
    }

    #[test]
    fn invariants_fail_when_language_tally_mismatches() {
        let idx = ProjectIndex {
            generated_at: "now".into(),
            workspace_root: "/ws".into(),
            total_files_scanned: 2,
            languages: HashMap::from([("typescript".to_string(), 1)]),
            files: vec![],
            symbols: vec![],
            imports: vec![],
            uses: vec![],
            dependencies: Dependencies::default(),
        };
        assert!(idx.check_invariants().is_err());
    }
}
