//! Audit Logger: an append-only JSONL file per session at
//! `<state_dir>/audit/<session_id>.jsonl`. Best-effort — an IO failure is
//! logged and swallowed so a failing audit write can never crash the task.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use serde_json::Value;
use va_core::audit::AuditEvent;

pub struct AuditLogger {
    path: PathBuf,
    session_id: String,
}

impl AuditLogger {
    pub fn new(state_dir: &std::path::Path, session_id: impl Into<String>) -> Self {
        let session_id = session_id.into();
        Self {
            path: state_dir.join("audit").join(format!("{session_id}.jsonl")),
            session_id,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Append one event. Never panics or propagates an error; failures are
    /// logged via `tracing` and otherwise ignored.
    pub fn log(&self, event_type: &str, data: Value) {
        let event = AuditEvent::new(self.session_id.clone(), event_type, data);
        if let Err(e) = self.write_line(&event) {
            tracing::warn!(error = %e, event_type, "failed to write audit log entry");
        }
    }

    fn write_line(&self, event: &AuditEvent) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let line = event
            .to_line()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let mut file = OpenOptions::new().append(true).create(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn log_creates_parent_dirs_and_file() {
        let dir = tempdir().unwrap();
        let logger = AuditLogger::new(dir.path(), "session-1");
        logger.log("task_start", serde_json::json!({}));
        assert!(logger.path().exists());
    }

    #[test]
    fn log_appends_multiple_lines() {
        let dir = tempdir().unwrap();
        let logger = AuditLogger::new(dir.path(), "session-1");
        logger.log("task_start", serde_json::json!({}));
        logger.log("write_applied", serde_json::json!({"path": "a.txt"}));

        let content = std::fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let _: serde_json::Value = serde_json::from_str(line).unwrap();
        }
    }

    #[test]
    fn log_path_includes_session_id() {
        let dir = tempdir().unwrap();
        let logger = AuditLogger::new(dir.path(), "abc123");
        assert!(logger.path().ends_with("audit/abc123.jsonl"));
    }

    #[test]
    fn log_does_not_panic_when_parent_cannot_be_created() {
        let dir = tempdir().unwrap();
        let blocking_file = dir.path().join("audit");
        std::fs::write(&blocking_file, "not a directory").unwrap();

        let logger = AuditLogger::new(dir.path(), "session-1");
        logger.log("task_start", serde_json::json!({}));
    }
}
