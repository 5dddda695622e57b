//! File Toolkit: list/read/write/exists/delete, all routed
//! through the Path Sandbox.

use std::fs;
use std::path::{Path, PathBuf};

use va_sandbox::Sandbox;

/// Directories pruned from `list`.
pub const IGNORED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "dist",
    "build",
    "coverage",
    ".next",
    ".turbo",
    ".idea",
    ".vscode",
];

#[derive(Debug, Clone)]
pub struct ListOptions {
    pub depth: usize,
    pub max_entries: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            depth: 16,
            max_entries: 10_000,
        }
    }
}

/// Pre-order directory listing with sorted entries, pruning
/// [`IGNORED_DIRS`], honoring `depth` and a hard `max_entries` cap.
/// Directories are rendered with a trailing `/`; paths are relative.
pub fn list(sandbox: &Sandbox, path: &str, opts: &ListOptions) -> Result<Vec<String>, String> {
    let root = sandbox
        .resolve(path)
        .map_err(|e| format!("{path} is outside workspace root: {e}"))?;
    let mut out = Vec::new();
    walk(sandbox, &root, 0, opts, &mut out);
    out.truncate(opts.max_entries);
    Ok(out)
}

fn walk(sandbox: &Sandbox, dir: &Path, depth: usize, opts: &ListOptions, out: &mut Vec<String>) {
    if out.len() >= opts.max_entries || depth > opts.depth {
        return;
    }
    let Ok(read_dir) = fs::read_dir(dir) else {
        return;
    };
    let mut entries: Vec<_> = read_dir.filter_map(|e| e.ok()).collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        if out.len() >= opts.max_entries {
            return;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let entry_path = entry.path();
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());

        if is_dir && IGNORED_DIRS.contains(&name.as_str()) {
            continue;
        }

        let rel = sandbox.to_relative(&entry_path);
        if is_dir {
            out.push(format!("{rel}/"));
            walk(sandbox, &entry_path, depth + 1, opts, out);
        } else {
            out.push(rel);
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReadSegment {
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
    pub total_lines: usize,
    pub truncated: bool,
}

/// Read a whole UTF-8 file and slice `[start_line, end_line]` inclusive
/// (1-based; defaults to the whole file), clipping to `max_chars` with a
/// visible truncation suffix.
pub fn read_segment(
    sandbox: &Sandbox,
    path: &str,
    start_line: Option<usize>,
    end_line: Option<usize>,
    max_chars: usize,
) -> Result<ReadSegment, String> {
    let resolved = sandbox
        .resolve(path)
        .map_err(|e| format!("{path} is outside workspace root: {e}"))?;
    let content = fs::read_to_string(&resolved).map_err(|e| format!("failed to read {path}: {e}"))?;
    let lines: Vec<&str> = content.lines().collect();
    let total_lines = lines.len();

    let start = start_line.unwrap_or(1).max(1);
    let end = end_line.unwrap_or(total_lines).min(total_lines.max(1));
    let slice: Vec<&str> = if start > end || total_lines == 0 {
        Vec::new()
    } else {
        lines[start.saturating_sub(1)..end.min(total_lines)].to_vec()
    };
    let sliced_text = slice.join("\n");

    let (clipped, truncated) = clip_chars(&sliced_text, max_chars);

    Ok(ReadSegment {
        content: clipped,
        start_line: start,
        end_line: end,
        total_lines,
        truncated,
    })
}

fn clip_chars(text: &str, max_chars: usize) -> (String, bool) {
    let total = text.chars().count();
    if total <= max_chars {
        return (text.to_string(), false);
    }
    let dropped = total - max_chars;
    let clipped: String = text.chars().take(max_chars).collect();
    (
        format!("{clipped}\n... [truncated, {dropped} chars dropped]"),
        true,
    )
}

/// Create parent directories, then write UTF-8 content.
pub fn write(sandbox: &Sandbox, path: &str, content: &str) -> Result<PathBuf, String> {
    let resolved = sandbox
        .resolve(path)
        .map_err(|e| format!("{path} is outside workspace root: {e}"))?;
    if let Some(parent) = resolved.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("failed to create dirs: {e}"))?;
    }
    fs::write(&resolved, content).map_err(|e| format!("failed to write {path}: {e}"))?;
    Ok(resolved)
}

pub fn exists(sandbox: &Sandbox, path: &str) -> bool {
    sandbox.resolve(path).map(|p| p.exists()).unwrap_or(false)
}

/// Read the file if it exists; absent file yields `""`.
pub fn read_if_exists(sandbox: &Sandbox, path: &str) -> String {
    sandbox
        .resolve(path)
        .ok()
        .and_then(|p| fs::read_to_string(p).ok())
        .unwrap_or_default()
}

/// Delete the file if it exists; absent file is a no-op.
pub fn delete_if_exists(sandbox: &Sandbox, path: &str) -> Result<(), String> {
    let Ok(resolved) = sandbox.resolve(path) else {
        return Ok(());
    };
    if resolved.exists() {
        fs::remove_file(&resolved).map_err(|e| format!("failed to delete {path}: {e}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sandbox_in(dir: &Path) -> Sandbox {
        Sandbox::new(dir.to_path_buf())
    }

    #[test]
    fn list_sorts_and_marks_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("b_dir")).unwrap();
        fs::write(dir.path().join("a_file.txt"), "x").unwrap();
        let sb = sandbox_in(dir.path());
        let entries = list(&sb, ".", &ListOptions::default()).unwrap();
        assert_eq!(entries, vec!["a_file.txt", "b_dir/"]);
    }

    #[test]
    fn list_prunes_ignored_dirs() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/pkg.js"), "x").unwrap();
        fs::write(dir.path().join("keep.txt"), "x").unwrap();
        let sb = sandbox_in(dir.path());
        let entries = list(&sb, ".", &ListOptions::default()).unwrap();
        assert_eq!(entries, vec!["keep.txt", "node_modules/"]);
    }

    #[test]
    fn list_honors_max_entries_exactly() {
        let dir = tempdir().unwrap();
        for i in 0..10 {
            fs::write(dir.path().join(format!("f{i}.txt")), "x").unwrap();
        }
        let sb = sandbox_in(dir.path());
        let opts = ListOptions {
            depth: 16,
            max_entries: 3,
        };
        let entries = list(&sb, ".", &opts).unwrap();
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn read_segment_defaults_to_whole_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "one\ntwo\nthree").unwrap();
        let sb = sandbox_in(dir.path());
        let seg = read_segment(&sb, "f.txt", None, None, 10_000).unwrap();
        assert_eq!(seg.content, "one\ntwo\nthree");
        assert_eq!(seg.total_lines, 3);
        assert!(!seg.truncated);
    }

    #[test]
    fn read_segment_slices_inclusive_range() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "one\ntwo\nthree\nfour").unwrap();
        let sb = sandbox_in(dir.path());
        let seg = read_segment(&sb, "f.txt", Some(2), Some(3), 10_000).unwrap();
        assert_eq!(seg.content, "two\nthree");
    }

    #[test]
    fn read_segment_clips_with_visible_marker() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "abcdefghij").unwrap();
        let sb = sandbox_in(dir.path());
        let seg = read_segment(&sb, "f.txt", None, None, 4).unwrap();
        assert!(seg.truncated);
        assert!(seg.content.starts_with("abcd"));
        assert!(seg.content.contains("truncated"));
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let sb = sandbox_in(dir.path());
        write(&sb, "nested/dir/f.txt", "hi").unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("nested/dir/f.txt")).unwrap(), "hi");
    }

    #[test]
    fn exists_false_for_absent_file() {
        let dir = tempdir().unwrap();
        let sb = sandbox_in(dir.path());
        assert!(!exists(&sb, "nope.txt"));
    }

    #[test]
    fn read_if_exists_returns_empty_for_absent_file() {
        let dir = tempdir().unwrap();
        let sb = sandbox_in(dir.path());
        assert_eq!(read_if_exists(&sb, "nope.txt"), "");
    }

    #[test]
    fn delete_if_exists_is_noop_for_absent_file() {
        let dir = tempdir().unwrap();
        let sb = sandbox_in(dir.path());
        assert!(delete_if_exists(&sb, "nope.txt").is_ok());
    }

    #[test]
    fn delete_if_exists_removes_present_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f.txt"), "x").unwrap();
        let sb = sandbox_in(dir.path());
        delete_if_exists(&sb, "f.txt").unwrap();
        assert!(!dir.path().join("f.txt").exists());
    }

    #[test]
    fn list_rejects_path_outside_root() {
        let dir = tempdir().unwrap();
        let sb = sandbox_in(dir.path());
        assert!(list(&sb, "../", &ListOptions::default()).is_err());
    }
}
