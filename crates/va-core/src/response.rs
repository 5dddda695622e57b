//! Model Response: the normalized shape produced by the
//! Response Parser from raw model text.

use serde::{Deserialize, Deserializer, Serialize};

use crate::action::AgentAction;
use crate::memory::MemoryUpdates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Continue,
    Done,
    NeedUser,
}

/// A verify command as the model may express it: a bare string or
/// `{"command": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyCommand {
    pub command: String,
}

impl<'de> Deserialize<'de> for VerifyCommand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Bare(String),
            Wrapped { command: String },
        }
        match Wire::deserialize(deserializer)? {
            Wire::Bare(command) => Ok(VerifyCommand { command }),
            Wire::Wrapped { command } => Ok(VerifyCommand { command }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub status: ResponseStatus,
    #[serde(default)]
    pub assistant_message: String,
    #[serde(default)]
    pub plan: Vec<String>,
    #[serde(default)]
    pub actions: Vec<AgentAction>,
    #[serde(default)]
    pub verify: Vec<VerifyCommand>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub memory_updates: Option<MemoryUpdates>,
}

impl ModelResponse {
    /// The safe fallback returned by the parser on any malformed input
    ///.
    pub fn need_user_retry(question: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::NeedUser,
            assistant_message: String::new(),
            plan: Vec::new(),
            actions: Vec::new(),
            verify: Vec::new(),
            question: Some(question.into()),
            memory_updates: None,
        }
    }
}
