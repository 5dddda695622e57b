//! Builds the conversation seed the orchestrator hands the model: a
//! system prompt naming the action alphabet and response schema, and a
//! user message carrying workspace/scanner/memory/policy context.

use va_core::memory::ProjectMemory;
use va_core::policy::Policy;

pub fn system_prompt() -> String {
    r#"You are an autonomous coding agent operating on a real codebase through a restricted set of tools.

You may only act through the following JSON-tagged actions, placed in the "actions" array of your reply:
  {"action":"list_files","path":".","depth":2,"max_entries":200}
  {"action":"read_file","path":"src/main.rs","start_line":1,"end_line":200}
  {"action":"grep","pattern":"TODO","path":".","max_matches":50}
  {"action":"run_command","command":"npm test"}
  {"action":"write_file","path":"src/main.rs","content":"..."}
  {"action":"scan_project","refresh":false}
  {"action":"symbol_lookup","query":"handleRequest","language":"typescript","limit":20}
  {"action":"find_references","name":"handleRequest","language":"typescript","limit":20}
  {"action":"dependency_map"}
  {"action":"memory_set","key":"style.imports","value":"absolute"}
  {"action":"memory_get","key":"style.imports"}

Every reply must be a single strict JSON object, no prose outside it, of the shape:
{
  "status": "continue" | "done" | "need_user",
  "assistant_message": "short human-readable update",
  "plan": ["ordered", "short", "steps"],
  "actions": [ ... up to 6 of the actions above ... ],
  "verify": ["shell command", {"command": "shell command"}],
  "question": "only when status is need_user",
  "memory_updates": {
    "project_rules": ["..."],
    "architecture_notes": ["..."],
    "common_commands": ["verify:npm test"],
    "kv": {"key": "value"}
  }
}

Writes are only applied after an explicit human approval of a shown diff. A write that changes nothing on disk is a no-op. Stay within the declared action alphabet; anything else is dropped silently."#
        .to_string()
}

pub fn context_message(workspace_summary: &str, scan_summary: &str, memory: &ProjectMemory, policy: &Policy) -> String {
    let memory_json = serde_json::to_string_pretty(memory).unwrap_or_default();
    let policy_json = serde_json::to_string_pretty(policy).unwrap_or_default();
    format!(
        "Workspace summary:\n{workspace_summary}\n\nProject scan summary:\n{scan_summary}\n\nProject memory:\n{memory_json}\n\nActive policy:\n{policy_json}"
    )
}

pub fn task_message(goal: &str) -> String {
    format!("User task: {goal}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_names_every_action() {
        let prompt = system_prompt();
        for action in [
            "list_files",
            "read_file",
            "grep",
            "run_command",
            "write_file",
            "scan_project",
            "symbol_lookup",
            "find_references",
            "dependency_map",
            "memory_set",
            "memory_get",
        ] {
            assert!(prompt.contains(action), "missing {action}");
        }
    }

    #[test]
    fn task_message_embeds_goal() {
        assert_eq!(task_message("fix the bug"), "User task: fix the bug");
    }

    #[test]
    fn context_message_includes_all_sections() {
        let msg = context_message("3 files", "3 files scanned", &ProjectMemory::default(), &Policy::default());
        assert!(msg.contains("Workspace summary"));
        assert!(msg.contains("Project scan summary"));
        assert!(msg.contains("Project memory"));
        assert!(msg.contains("Active policy"));
    }
}
