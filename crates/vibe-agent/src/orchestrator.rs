//! The plan → act → verify → repair loop: seeds a conversation, drives
//! the model one iteration at a time, dispatches its actions, runs
//! verification, and offers a rollback when a task ends with failing
//! changes still on disk.

use serde_json::json;

use va_core::action::AgentAction;
use va_core::chat::ChatMessage;
use va_core::config::RuntimeConfig;
use va_core::response::ResponseStatus;
use va_core::tool_result::ToolResult;
use va_fs::ListOptions;
use va_memory::MemoryStore;
use va_protocol::{parse_model_response, ChatClient};
use va_sandbox::Sandbox;
use va_scanner::ProjectScanner;
use va_tracker::ChangeTracker;

use crate::dispatch::{self, DispatchContext};
use crate::prompt;
use crate::state;
use crate::ui::Ui;
use va_audit::AuditLogger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    NoApiKey,
    Done,
    ModelError,
    IterationCapReached,
    StoppedEarly,
}

/// Run one task to completion. `goal` is the user's free-text request.
pub async fn run_task(
    config: &RuntimeConfig,
    goal: &str,
    chat_client: &dyn ChatClient,
    ui: &mut dyn Ui,
) -> TaskOutcome {
    if config.api_key.is_none() {
        ui.show_message(
            "No API key configured. Set VIBE_API_KEY (or GROQ_API_KEY/OPENAI_API_KEY) and retry.",
        );
        return TaskOutcome::NoApiKey;
    }

    let sandbox = Sandbox::new(config.workspace_root.clone());
    let memory = MemoryStore::new(&config.state_dir);
    let policy = state::load_or_init_policy(&config.state_dir);
    let scanner = ProjectScanner::new(
        Sandbox::new(config.workspace_root.clone()),
        &config.state_dir,
        config.max_scan_files,
    );
    let mut tracker = ChangeTracker::new();
    let session_id = state::new_session_id();
    let audit = AuditLogger::new(&config.state_dir, session_id.clone());
    audit.log("task_start", json!({"goal": goal, "session_id": session_id}));

    let mut conversation = seed_conversation(&sandbox, &scanner, &memory, &policy, goal).await;

    let mut consecutive_verify_failures: u32 = 0;
    let mut any_verify_failed_overall = false;
    let mut outcome = TaskOutcome::IterationCapReached;

    for _iteration in 1..=config.max_iterations {
        let raw = match chat_client.complete(&conversation, config.tool_timeout).await {
            Ok(text) => text,
            Err(e) => {
                audit.log("model_error", json!({"error": e.to_string()}));
                ui.show_message(&format!("Model call failed: {e}"));
                outcome = TaskOutcome::ModelError;
                break;
            }
        };

        let response = parse_model_response(&raw);
        ui.show_message(&response.assistant_message);
        ui.show_plan(&response.plan);
        audit.log(
            "model_response",
            json!({
                "status": format!("{:?}", response.status),
                "assistant_message": response.assistant_message,
                "plan": response.plan,
            }),
        );

        if let Some(updates) = &response.memory_updates {
            let tags = memory.apply_updates(updates).await;
            if !tags.is_empty() {
                ui.show_message(&format!("Memory updated: {}", tags.join(", ")));
            }
        }

        let mut had_successful_write = false;
        let mut tool_results: Vec<ToolResult> = Vec::new();
        for action in &response.actions {
            let mut ctx = DispatchContext {
                sandbox: &sandbox,
                policy: &policy,
                scanner: &scanner,
                memory: &memory,
                tracker: &mut tracker,
                tool_timeout: config.tool_timeout,
                max_output_chars: config.max_tool_output_chars,
            };
            let (result, changed) = dispatch::dispatch(&mut ctx, action, ui).await;
            ui.show_tool_result(&result.tool, result.ok, &result.summary);
            if changed && matches!(action, AgentAction::WriteFile { .. }) {
                audit.log("write_applied", serde_json::to_value(&result).unwrap_or_default());
            }
            audit.log("action_result", serde_json::to_value(&result).unwrap_or_default());
            if changed {
                had_successful_write = true;
            }
            tool_results.push(result);
        }

        let iteration_verify_failed = run_verify_phase(
            config,
            &sandbox,
            &policy,
            &memory,
            had_successful_write,
            &response.verify,
            &audit,
            ui,
            &mut tool_results,
        )
        .await;

        if iteration_verify_failed {
            consecutive_verify_failures += 1;
            any_verify_failed_overall = true;
        } else {
            consecutive_verify_failures = 0;
        }

        if consecutive_verify_failures >= config.max_auto_repair_rounds && tracker.has_changes() {
            let answer = ui.ask_question(
                "Verification has failed repeatedly. Continue attempting repairs? [y/N]",
            );
            if !matches!(answer.to_lowercase().as_str(), "y" | "yes") {
                outcome = TaskOutcome::StoppedEarly;
                break;
            }
            consecutive_verify_failures = 0;
        }

        let aggregated: String = tool_results
            .iter()
            .map(|r| r.clipped_json(config.max_tool_output_chars))
            .collect::<Vec<_>>()
            .join("\n");
        conversation.push(ChatMessage::assistant(response.assistant_message.clone()));
        conversation.push(ChatMessage::user(format!("Tool results:\n{aggregated}")));

        if response.status == ResponseStatus::NeedUser {
            let question = response.question.clone().unwrap_or_default();
            let answer = ui.ask_question(&question);
            conversation.push(ChatMessage::user(answer));
            continue;
        }

        if response.status == ResponseStatus::Done {
            if iteration_verify_failed {
                audit.log("done_override", json!({"reason": "verification failed"}));
                conversation.push(ChatMessage::user(
                    "Verification failed. Continue and fix errors before marking done.",
                ));
            } else {
                outcome = TaskOutcome::Done;
                break;
            }
        }
    }

    let may_prompt_rollback = matches!(outcome, TaskOutcome::IterationCapReached | TaskOutcome::StoppedEarly);
    if may_prompt_rollback && tracker.has_changes() && any_verify_failed_overall {
        if ui.confirm_rollback(tracker.tracked_paths()) {
            match tracker.rollback(&sandbox) {
                Ok(restored) => {
                    audit.log("rollback", json!({"restored": restored}));
                    ui.show_message(&format!("Rolled back {} file(s).", restored.len()));
                }
                Err(e) => ui.show_message(&format!("Rollback failed: {e}")),
            }
        }
    }

    print_change_summary(&tracker, ui);
    audit.log("task_end", json!({"outcome": format!("{outcome:?}")}));
    ui.show_message(&format!("Audit log: {}", audit.path().display()));

    outcome
}

async fn seed_conversation(
    sandbox: &Sandbox,
    scanner: &ProjectScanner,
    memory: &MemoryStore,
    policy: &va_core::policy::Policy,
    goal: &str,
) -> Vec<ChatMessage> {
    let entries = va_fs::list(sandbox, ".", &ListOptions::default()).unwrap_or_default();
    let workspace_summary = format!("{} entries at the workspace root (recursive)", entries.len());
    let scan_summary = scanner.summary().await;
    let memory_doc = memory.load().await;

    vec![
        ChatMessage::system(prompt::system_prompt()),
        ChatMessage::user(prompt::context_message(&workspace_summary, &scan_summary, &memory_doc, policy)),
        ChatMessage::user(prompt::task_message(goal)),
    ]
}

#[allow(clippy::too_many_arguments)]
async fn run_verify_phase(
    config: &RuntimeConfig,
    sandbox: &Sandbox,
    policy: &va_core::policy::Policy,
    memory: &MemoryStore,
    had_successful_write: bool,
    model_verify: &[va_core::response::VerifyCommand],
    audit: &AuditLogger,
    ui: &mut dyn Ui,
    tool_results: &mut Vec<ToolResult>,
) -> bool {
    let mut commands: Vec<String> = model_verify.iter().map(|v| v.command.clone()).collect();

    if config.auto_verify && had_successful_write {
        let memory_doc = memory.load().await;
        for discovered in va_verify::discover_verify_commands(sandbox, &memory_doc, 5) {
            if !commands.contains(&discovered) {
                commands.push(discovered);
            }
        }
    }

    let mut any_failed = false;
    for command in &commands {
        let result = match va_policy::check_command(policy, command) {
            Err(e) => ToolResult::fail("verify", format!("Blocked by policy: {e}")),
            Ok(()) => {
                let exec = va_process::run(
                    command,
                    &config.workspace_root,
                    config.tool_timeout,
                    config.max_tool_output_chars,
                )
                .await;
                dispatch::to_command_result("verify", exec)
            }
        };
        ui.show_tool_result(&result.tool, result.ok, &result.summary);
        audit.log("verify_result", serde_json::to_value(&result).unwrap_or_default());
        if !result.ok {
            any_failed = true;
        }
        tool_results.push(result);
    }
    any_failed
}

fn print_change_summary(tracker: &ChangeTracker, ui: &mut dyn Ui) {
    let changed = tracker.changed_files();
    if changed.is_empty() {
        return;
    }
    ui.show_message("Change summary:");
    for (path, before, after) in changed {
        let diff = va_core::diff::unified_diff(&path, &before, &after);
        let stat = va_core::diff::diff_stat(&diff);
        ui.show_message(&format!("  {path}: +{} -{}", stat.added, stat.removed));
    }
}
