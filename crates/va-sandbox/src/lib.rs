//! Path Sandbox: every user-supplied path is resolved
//! against the workspace root and must lie within it. A path escape is a
//! fatal per-action error (`PathEscape`); it never aborts the session.

use std::path::{Component, Path, PathBuf};

use va_core::error::PathEscape;

#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// `root` is expected already-canonical (the caller resolves symlinks
    /// once at startup); `Sandbox` itself never follows a symlink past the
    /// root when resolving a child path, since it works lexically.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `user_path` (absolute or relative) against the workspace
    /// root. Fails with [`PathEscape`] if the lexically-normalized result
    /// is neither the root nor a descendant of it.
    pub fn resolve(&self, user_path: &str) -> Result<PathBuf, PathEscape> {
        let candidate = Path::new(user_path);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };
        let normalized = normalize_lexically(&joined);

        if is_within(&self.root, &normalized) {
            Ok(normalized)
        } else {
            Err(PathEscape {
                path: user_path.to_string(),
            })
        }
    }

    /// Converse of `resolve`: produce a forward-slash path relative to the
    /// root from an absolute path known to be inside it.
    pub fn to_relative(&self, abs_path: &Path) -> String {
        let rel = abs_path.strip_prefix(&self.root).unwrap_or(abs_path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Lexical normalization: resolves `.` and `..` components without
/// touching the filesystem (so a not-yet-created write target still
/// resolves correctly).
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(windows)]
fn is_within(root: &Path, candidate: &Path) -> bool {
    let root = root.to_string_lossy().to_lowercase();
    let candidate = candidate.to_string_lossy().to_lowercase();
    candidate == root || candidate.starts_with(&format!("{root}\\")) || candidate.starts_with(&format!("{root}/"))
}

#[cfg(not(windows))]
fn is_within(root: &Path, candidate: &Path) -> bool {
    candidate == root || candidate.starts_with(root)
}
