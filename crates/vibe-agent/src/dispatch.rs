//! Action dispatch: every `AgentAction` is matched exhaustively and
//! turned into a `ToolResult` that never propagates a hard error back to
//! the orchestrator loop — a failing action returns `ok:false` and the
//! loop keeps going.

use std::time::Duration;

use serde_json::json;

use va_core::action::AgentAction;
use va_core::index::Language;
use va_core::memory::MemoryUpdates;
use va_core::policy::Policy;
use va_core::tool_result::ToolResult;
use va_fs::ListOptions;
use va_memory::MemoryStore;
use va_sandbox::Sandbox;
use va_scanner::ProjectScanner;
use va_tracker::ChangeTracker;

use crate::ui::Ui;

const MAX_DIFF_PREVIEW_CHARS: usize = 30_000;

pub struct DispatchContext<'a> {
    pub sandbox: &'a Sandbox,
    pub policy: &'a Policy,
    pub scanner: &'a ProjectScanner,
    pub memory: &'a MemoryStore,
    pub tracker: &'a mut ChangeTracker,
    pub tool_timeout: Duration,
    pub max_output_chars: usize,
}

/// Dispatch one action. The returned `bool` is `true` iff this call was a
/// `write_file` that actually changed on-disk content — the orchestrator
/// uses it to decide whether to run auto-verify discovery this iteration.
pub async fn dispatch(ctx: &mut DispatchContext<'_>, action: &AgentAction, ui: &mut dyn Ui) -> (ToolResult, bool) {
    match action {
        AgentAction::ListFiles { path, depth, max_entries } => {
            let mut opts = ListOptions::default();
            if let Some(d) = depth {
                opts.depth = *d as usize;
            }
            if let Some(m) = max_entries {
                opts.max_entries = *m;
            }
            match va_fs::list(ctx.sandbox, path, &opts) {
                Ok(entries) => (
                    ToolResult::ok_with_data(
                        "list_files",
                        format!("{} entries under {path}", entries.len()),
                        json!(entries),
                    ),
                    false,
                ),
                Err(e) => (ToolResult::fail("list_files", e), false),
            }
        }

        AgentAction::ReadFile { path, start_line, end_line } => {
            match va_fs::read_segment(ctx.sandbox, path, *start_line, *end_line, ctx.max_output_chars) {
                Ok(seg) => (
                    ToolResult::ok_with_data(
                        "read_file",
                        format!(
                            "lines {}-{} of {} ({path}){}",
                            seg.start_line,
                            seg.end_line,
                            seg.total_lines,
                            if seg.truncated { ", truncated" } else { "" }
                        ),
                        json!({
                            "content": seg.content,
                            "start_line": seg.start_line,
                            "end_line": seg.end_line,
                            "total_lines": seg.total_lines,
                            "truncated": seg.truncated,
                        }),
                    ),
                    false,
                ),
                Err(e) => (ToolResult::fail("read_file", e), false),
            }
        }

        AgentAction::Grep { pattern, path, max_matches } => {
            let search_path = path.as_deref().unwrap_or(".");
            let limit = max_matches.unwrap_or(200);
            match va_grep::grep(ctx.sandbox, pattern, search_path, limit) {
                Ok(matches) => (
                    ToolResult::ok_with_data(
                        "grep",
                        format!("{} matches for {pattern:?}", matches.len()),
                        json!(matches),
                    ),
                    false,
                ),
                Err(e) => (ToolResult::fail("grep", e), false),
            }
        }

        AgentAction::RunCommand { command } => (run_gated_command(ctx, command).await, false),

        AgentAction::WriteFile { path, content } => write_file(ctx, path, content, ui).await,

        AgentAction::ScanProject { refresh } => {
            let idx = ctx.scanner.scan(*refresh).await;
            let summary = format!("{} files scanned", idx.total_files_scanned);
            (
                ToolResult::ok_with_data(
                    "scan_project",
                    summary,
                    serde_json::to_value(idx.as_ref()).unwrap_or_default(),
                ),
                false,
            )
        }

        AgentAction::SymbolLookup { query, language, limit } => {
            let lang = language.as_deref().and_then(parse_language);
            let symbols = ctx.scanner.lookup_symbols(query, lang, *limit).await;
            (
                ToolResult::ok_with_data(
                    "symbol_lookup",
                    format!("{} symbols matching {query:?}", symbols.len()),
                    json!(symbols),
                ),
                false,
            )
        }

        AgentAction::FindReferences { name, language, limit } => {
            let lang = language.as_deref().and_then(parse_language);
            let uses = ctx.scanner.find_references(name, lang, *limit).await;
            (
                ToolResult::ok_with_data(
                    "find_references",
                    format!("{} references to {name:?}", uses.len()),
                    json!(uses),
                ),
                false,
            )
        }

        AgentAction::DependencyMap => {
            let deps = ctx.scanner.dependency_map().await;
            (
                ToolResult::ok_with_data("dependency_map", "dependency map built", json!(deps)),
                false,
            )
        }

        AgentAction::MemorySet { key, value } => {
            let updates = MemoryUpdates {
                kv: std::collections::HashMap::from([(key.clone(), value.clone())]),
                ..Default::default()
            };
            let tags = ctx.memory.apply_updates(&updates).await;
            let summary = if tags.is_empty() {
                format!("{key} unchanged")
            } else {
                format!("updated: {}", tags.join(", "))
            };
            (ToolResult::ok("memory_set", summary), false)
        }

        AgentAction::MemoryGet { key } => {
            let memory = ctx.memory.load().await;
            match memory.kv.get(key) {
                Some(value) => (
                    ToolResult::ok_with_data("memory_get", value.clone(), json!({"key": key, "value": value})),
                    false,
                ),
                None => (ToolResult::fail("memory_get", format!("no memory value for key '{key}'")), false),
            }
        }
    }
}

async fn run_gated_command(ctx: &DispatchContext<'_>, command: &str) -> ToolResult {
    if let Err(e) = va_policy::check_command(ctx.policy, command) {
        return ToolResult::fail("run_command", format!("Blocked by policy: {e}"));
    }
    let outcome = va_process::run(command, ctx.sandbox.root(), ctx.tool_timeout, ctx.max_output_chars).await;
    to_command_result("run_command", outcome)
}

/// Shared by `run_command` and the verify phase: both run a shell command
/// through the same timeout/cap discipline and attach a parsed failure
/// report on non-success.
pub fn to_command_result(tool: &str, outcome: va_process::ExecutionOutcome) -> ToolResult {
    let summary = format!(
        "exit={:?} timed_out={} ({} ms)",
        outcome.exit_code, outcome.timed_out, outcome.duration_ms
    );
    if outcome.succeeded() {
        ToolResult::ok_with_data(tool, summary, json!(outcome))
    } else {
        let combined = format!("{}\n{}", outcome.stdout, outcome.stderr);
        let trace = va_diagnostics::parse(&combined);
        let frames: Vec<_> = trace
            .frames
            .iter()
            .map(|f| {
                json!({
                    "path": f.path,
                    "line": f.line,
                    "column": f.column,
                    "function": f.function,
                    "language": f.language.as_str(),
                })
            })
            .collect();
        ToolResult::fail_with_data(
            tool,
            summary,
            json!({
                "outcome": outcome,
                "exception_line": trace.exception_line,
                "frames": frames,
            }),
        )
    }
}

async fn write_file(ctx: &mut DispatchContext<'_>, path: &str, content: &str, ui: &mut dyn Ui) -> (ToolResult, bool) {
    match va_policy::check_write(ctx.policy, path, content) {
        Ok(()) => {}
        Err(va_policy::WriteCheckError::PathBlocked(reason)) => {
            return (ToolResult::fail("write_file", format!("Blocked by policy: {reason}")), false);
        }
        Err(va_policy::WriteCheckError::SecretsDetected(findings)) => {
            let findings_json: Vec<_> = findings
                .iter()
                .map(|f| json!({"type": f.label, "kind": f.kind, "masked_snippet": f.masked_snippet}))
                .collect();
            return (
                ToolResult::fail_with_data(
                    "write_file",
                    format!("Blocked by policy: potential secret(s) detected ({} finding(s))", findings.len()),
                    json!({"findings": findings_json}),
                ),
                false,
            );
        }
    }

    let existed = va_fs::exists(ctx.sandbox, path);
    let before = va_fs::read_if_exists(ctx.sandbox, path);

    if before == content {
        return (
            ToolResult::ok_with_data("write_file", "no changes", json!({"changed": false})),
            false,
        );
    }

    let diff = va_core::diff::unified_diff(path, &before, content);
    let preview = clip_diff(&diff);

    if !ui.approve_write(path, &preview) {
        return (ToolResult::fail("write_file", "write declined by user"), false);
    }

    ctx.tracker.record_before(path, existed, before.clone().into_bytes());

    match va_fs::write(ctx.sandbox, path, content) {
        Ok(_) => {
            ctx.tracker.record_after(path, content.as_bytes().to_vec());
            let stat = va_core::diff::diff_stat(&diff);
            (
                ToolResult::ok_with_data(
                    "write_file",
                    format!("wrote {path} (+{} -{})", stat.added, stat.removed),
                    json!({"changed": true, "added": stat.added, "removed": stat.removed}),
                ),
                true,
            )
        }
        Err(e) => (ToolResult::fail("write_file", e), false),
    }
}

fn clip_diff(diff: &str) -> String {
    if diff.chars().count() <= MAX_DIFF_PREVIEW_CHARS {
        return diff.to_string();
    }
    let clipped: String = diff.chars().take(MAX_DIFF_PREVIEW_CHARS).collect();
    format!("{clipped}\n... [diff truncated]")
}

fn parse_language(s: &str) -> Option<Language> {
    match s.to_lowercase().as_str() {
        "typescript" | "ts" => Some(Language::Typescript),
        "javascript" | "js" => Some(Language::Javascript),
        "python" | "py" => Some(Language::Python),
        _ => None,
    }
}
