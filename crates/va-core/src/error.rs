//! The error kinds an orchestrator needs to branch on, plus `PathEscape`,
//! which is fatal to a single path resolution rather than the whole action.

/// A path resolved outside the workspace root. Fatal for the one action
/// that produced it; never aborts the session.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("path '{path}' is outside workspace root")]
pub struct PathEscape {
    pub path: String,
}

/// Top-level error kinds an orchestrator-facing caller may need to branch
/// on. Most tool-level failures are carried in [`crate::ToolResult::ok`]
/// rather than as a Rust `Err`.
#[derive(thiserror::Error, Debug)]
pub enum AgentError {
    /// Configuration kind: no API key configured.
    #[error("no API key configured")]
    MissingApiKey,

    /// ModelIO kind: chat client transport failure or empty completion.
    #[error("model request failed: {0}")]
    ModelIo(String),

    /// PathEscape kind, surfaced through the shared error type.
    #[error(transparent)]
    PathEscape(#[from] PathEscape),

    /// Generic I/O failure wrapping, for components that need a uniform
    /// error type (scanner, memory store, tracker).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure for persisted stores.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
