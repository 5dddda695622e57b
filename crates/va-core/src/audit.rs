//! Audit Event: `{ts, session_id, type, data}`, one JSON
//! object per line.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub ts: String,
    pub session_id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: Value,
}

impl AuditEvent {
    pub fn new(session_id: impl Into<String>, event_type: impl Into<String>, data: Value) -> Self {
        Self {
            ts: chrono::Utc::now().to_rfc3339(),
            session_id: session_id.into(),
            event_type: event_type.into(),
            data,
        }
    }

    /// One `\n`-terminated JSON line, as written to
    /// `<stateDir>/audit/<session_id>.jsonl`.
    pub fn to_line(&self) -> serde_json::Result<String> {
        Ok(format!("{}\n", serde_json::to_string(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_line_is_newline_terminated_json() {
        let ev = AuditEvent::new("2026-01-01T00-00-00Z", "task_start", serde_json::json!({}));
        let line = ev.to_line().unwrap();
        assert!(line.ends_with('\n'));
        let without_nl = &line[..line.len() - 1];
        let _: Value = serde_json::from_str(without_nl).unwrap();
    }

    #[test]
    fn type_field_serializes_as_type_not_event_type() {
        let ev = AuditEvent::new("sid", "action_result", serde_json::json!({"ok": true}));
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains(r#""type":"action_result""#));
    }
}
