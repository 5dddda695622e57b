//! Tool Result: the envelope every dispatched action produces.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool: String,
    pub ok: bool,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolResult {
    pub fn ok(tool: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            ok: true,
            summary: summary.into(),
            data: None,
        }
    }

    pub fn ok_with_data(tool: impl Into<String>, summary: impl Into<String>, data: Value) -> Self {
        Self {
            tool: tool.into(),
            ok: true,
            summary: summary.into(),
            data: Some(data),
        }
    }

    pub fn fail(tool: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            ok: false,
            summary: summary.into(),
            data: None,
        }
    }

    pub fn fail_with_data(
        tool: impl Into<String>,
        summary: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            tool: tool.into(),
            ok: false,
            summary: summary.into(),
            data: Some(data),
        }
    }

    /// Clip the JSON-serialized form to `max_chars`, as the orchestrator
    /// does before re-inserting tool output into the conversation
    ///.
    pub fn clipped_json(&self, max_chars: usize) -> String {
        let full = serde_json::to_string(self).unwrap_or_default();
        if full.chars().count() <= max_chars {
            return full;
        }
        let clipped: String = full.chars().take(max_chars).collect();
        format!("{clipped}... [truncated]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_has_ok_false() {
        let r = ToolResult::fail("run_command", "Blocked by policy");
        assert!(!r.ok);
        assert_eq!(r.tool, "run_command");
    }

    #[test]
    fn clipped_json_under_limit_is_unchanged() {
        let r = ToolResult::ok("grep", "1 match");
        let clipped = r.clipped_json(10_000);
        assert_eq!(clipped, serde_json::to_string(&r).unwrap());
    }

    #[test]
    fn clipped_json_over_limit_is_truncated() {
        let r = ToolResult::ok_with_data(
            "read_file",
            "ok",
            serde_json::json!({"content": "x".repeat(1000)}),
        );
        let clipped = r.clipped_json(50);
        assert!(clipped.ends_with("... [truncated]"));
        assert!(clipped.len() < r.clipped_json(100_000).len());
    }
}
