//! Agent Action: a closed sum type over the restricted
//! tool alphabet the model may invoke. Constructed exclusively by the
//! Response Parser (`va-protocol`) and dispatched via exhaustive match in
//! the orchestrator (`vibe-agent`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AgentAction {
    ListFiles {
        path: String,
        #[serde(default)]
        depth: Option<u32>,
        #[serde(default)]
        max_entries: Option<usize>,
    },
    ReadFile {
        path: String,
        #[serde(default)]
        start_line: Option<usize>,
        #[serde(default)]
        end_line: Option<usize>,
    },
    Grep {
        pattern: String,
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        max_matches: Option<usize>,
    },
    RunCommand {
        command: String,
    },
    WriteFile {
        path: String,
        content: String,
    },
    ScanProject {
        #[serde(default)]
        refresh: bool,
    },
    SymbolLookup {
        query: String,
        #[serde(default)]
        language: Option<String>,
        #[serde(default)]
        limit: Option<usize>,
    },
    FindReferences {
        name: String,
        #[serde(default)]
        language: Option<String>,
        #[serde(default)]
        limit: Option<usize>,
    },
    DependencyMap,
    MemorySet {
        key: String,
        value: String,
    },
    MemoryGet {
        key: String,
    },
}

impl AgentAction {
    /// Wire/tool name for logging and `ToolResult::tool`.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::ListFiles { .. } => "list_files",
            Self::ReadFile { .. } => "read_file",
            Self::Grep { .. } => "grep",
            Self::RunCommand { .. } => "run_command",
            Self::WriteFile { .. } => "write_file",
            Self::ScanProject { .. } => "scan_project",
            Self::SymbolLookup { .. } => "symbol_lookup",
            Self::FindReferences { .. } => "find_references",
            Self::DependencyMap => "dependency_map",
            Self::MemorySet { .. } => "memory_set",
            Self::MemoryGet { .. } => "memory_get",
        }
    }
}
