//! Minimal unified-diff renderer: 3 lines of context, used by the
//! write_file approval preview and the end-of-task change summary. A
//! line-based LCS diff, small enough to own outright rather than pull in
//! an external diff crate.

const CONTEXT_LINES: usize = 3;

/// Per-file added/removed line counts for the change summary
///.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffStat {
    pub added: usize,
    pub removed: usize,
}

/// Render a unified diff between `before` and `after` with `path` as both
/// the `---`/`+++` file headers.
pub fn unified_diff(path: &str, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }
    let old_lines: Vec<&str> = before.lines().collect();
    let new_lines: Vec<&str> = after.lines().collect();
    let ops = diff_ops(&old_lines, &new_lines);

    let mut out = String::new();
    out.push_str(&format!("--- a/{path}\n"));
    out.push_str(&format!("+++ b/{path}\n"));

    for hunk in group_into_hunks(&ops) {
        let old_start = hunk.first().map(|o| o.old_index()).unwrap_or(0);
        let new_start = hunk.first().map(|o| o.new_index()).unwrap_or(0);
        let old_count = hunk
            .iter()
            .filter(|o| !matches!(o, DiffOp::Insert(..)))
            .count();
        let new_count = hunk
            .iter()
            .filter(|o| !matches!(o, DiffOp::Delete(..)))
            .count();
        out.push_str(&format!(
            "@@ -{},{} +{},{} @@\n",
            old_start + 1,
            old_count,
            new_start + 1,
            new_count
        ));
        for op in hunk {
            match op {
                DiffOp::Equal(_, _, line) => out.push_str(&format!(" {line}\n")),
                DiffOp::Delete(_, line) => out.push_str(&format!("-{line}\n")),
                DiffOp::Insert(_, line) => out.push_str(&format!("+{line}\n")),
            }
        }
    }
    out
}

/// Count added/removed lines from a unified diff, ignoring hunk headers
/// (`@@`) and file headers (`+++`, `---`).
pub fn diff_stat(diff: &str) -> DiffStat {
    let mut stat = DiffStat::default();
    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") || line.starts_with("@@") {
            continue;
        }
        if let Some(stripped) = line.strip_prefix('+') {
            let _ = stripped;
            stat.added += 1;
        } else if let Some(stripped) = line.strip_prefix('-') {
            let _ = stripped;
            stat.removed += 1;
        }
    }
    stat
}

#[derive(Debug, Clone)]
enum DiffOp<'a> {
    Equal(usize, usize, &'a str),
    Delete(usize, &'a str),
    Insert(usize, &'a str),
}

impl DiffOp<'_> {
    fn old_index(&self) -> usize {
        match self {
            DiffOp::Equal(i, _, _) => *i,
            DiffOp::Delete(i, _) => *i,
            DiffOp::Insert(i, _) => *i,
        }
    }
    fn new_index(&self) -> usize {
        match self {
            DiffOp::Equal(_, j, _) => *j,
            DiffOp::Delete(_, j) => *j,
            DiffOp::Insert(j, _) => *j,
        }
    }
}

/// Classic dynamic-programming LCS diff. Fine for source-file-sized
/// inputs; not intended for huge binary blobs (those never reach here —
/// write_file operates on UTF-8 text).
fn diff_ops<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<DiffOp<'a>> {
    let (n, m) = (old.len(), new.len());
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(DiffOp::Equal(i, j, old[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            ops.push(DiffOp::Delete(i, old[i]));
            i += 1;
        } else {
            ops.push(DiffOp::Insert(j, new[j]));
            j += 1;
        }
    }
    while i < n {
        ops.push(DiffOp::Delete(i, old[i]));
        i += 1;
    }
    while j < m {
        ops.push(DiffOp::Insert(j, new[j]));
        j += 1;
    }
    ops
}

/// Group diff ops into hunks separated by more than `2*CONTEXT_LINES`
/// consecutive equal lines, trimming surrounding context to `CONTEXT_LINES`.
fn group_into_hunks<'a>(ops: &[DiffOp<'a>]) -> Vec<Vec<DiffOp<'a>>> {
    let mut hunks = Vec::new();
    let mut current: Vec<DiffOp<'a>> = Vec::new();
    let mut trailing_equal = 0usize;

    for op in ops {
        match op {
            DiffOp::Equal(..) => {
                if current.is_empty() {
                    // leading context: keep only last CONTEXT_LINES equals
                    continue;
                }
                current.push(op.clone());
                trailing_equal += 1;
                if trailing_equal > CONTEXT_LINES * 2 {
                    let keep = current.len() - trailing_equal + CONTEXT_LINES;
                    current.truncate(keep);
                    hunks.push(std::mem::take(&mut current));
                    trailing_equal = 0;
                }
            }
            _ => {
                trailing_equal = 0;
                current.push(op.clone());
            }
        }
    }
    if current.iter().any(|o| !matches!(o, DiffOp::Equal(..))) {
        hunks.push(current);
    }

    // Re-derive leading context (CONTEXT_LINES equals before each hunk's
    // first change) using a second pass over full op stream indices.
    attach_leading_context(ops, hunks)
}

fn attach_leading_context<'a>(
    all_ops: &[DiffOp<'a>],
    hunks: Vec<Vec<DiffOp<'a>>>,
) -> Vec<Vec<DiffOp<'a>>> {
    hunks
        .into_iter()
        .map(|hunk| {
            let Some(first_change_old) = hunk
                .iter()
                .find(|o| !matches!(o, DiffOp::Equal(..)))
                .map(|o| o.old_index())
            else {
                return hunk;
            };
            let mut leading: Vec<DiffOp<'a>> = all_ops
                .iter()
                .filter(|o| matches!(o, DiffOp::Equal(i, _, _) if *i < first_change_old))
                .cloned()
                .collect();
            let keep = leading.len().saturating_sub(CONTEXT_LINES);
            leading.drain(0..keep);
            leading.extend(hunk);
            leading
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_yields_empty_diff() {
        assert_eq!(unified_diff("a.txt", "same\n", "same\n"), "");
    }

    #[test]
    fn simple_line_change_produces_hunk_headers() {
        let diff = unified_diff("a.txt", "one\ntwo\nthree\n", "one\nTWO\nthree\n");
        assert!(diff.starts_with("--- a/a.txt\n+++ b/a.txt\n"));
        assert!(diff.contains("@@"));
        assert!(diff.contains("-two"));
        assert!(diff.contains("+TWO"));
    }

    #[test]
    fn diff_stat_counts_added_and_removed_ignoring_headers() {
        let diff = unified_diff("a.txt", "one\ntwo\n", "one\nTWO\nthree\n");
        let stat = diff_stat(&diff);
        assert_eq!(stat.removed, 1);
        assert_eq!(stat.added, 2);
    }

    #[test]
    fn diff_stat_ignores_hunk_and_file_headers() {
        let diff = "--- a/x\n+++ b/x\n@@ -1,1 +1,1 @@\n-old\n+new\n";
        let stat = diff_stat(diff);
        assert_eq!(stat.added, 1);
        assert_eq!(stat.removed, 1);
    }

    #[test]
    fn pure_addition_has_zero_removed() {
        let diff = unified_diff("a.txt", "one\n", "one\ntwo\n");
        let stat = diff_stat(&diff);
        assert_eq!(stat.removed, 0);
        assert_eq!(stat.added, 1);
    }
}
