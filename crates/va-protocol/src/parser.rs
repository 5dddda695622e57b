//! Response Parser: a total function from raw model text
//! to a normalized [`ModelResponse`]. Never panics, never returns `Err` —
//! malformed input degrades to a safe `need_user` response.

use serde_json::Value;
use va_core::action::AgentAction;
use va_core::memory::{MemoryUpdates, MAX_KV_BATCH, MAX_LIST_ENTRIES};
use va_core::response::{ModelResponse, ResponseStatus, VerifyCommand};

const MAX_PLAN_STEPS: usize = 12;
const MAX_VERIFY_COMMANDS: usize = 8;
const MAX_ACTIONS: usize = 6;
const MAX_MEMORY_UPDATE_LIST: usize = 30;
const MAX_MEMORY_UPDATE_KV: usize = 50;

/// Total: always returns a usable `ModelResponse`.
pub fn parse_model_response(raw: &str) -> ModelResponse {
    let Some(json_text) = extract_json_text(raw) else {
        return ModelResponse::need_user_retry(
            "Your last reply did not contain a JSON object. Please respond with strict JSON.",
        );
    };
    let Ok(value) = serde_json::from_str::<Value>(&json_text) else {
        return ModelResponse::need_user_retry(
            "Your last reply was not valid JSON. Please respond with strict JSON.",
        );
    };
    normalize(&value)
}

/// Strip ``` fences if present, then take the substring between the first
/// `{` and the last `}`.
fn extract_json_text(raw: &str) -> Option<String> {
    let without_fences = raw.replace("```json", "```").replace("```JSON", "```").replace("```", "");
    let start = without_fences.find('{')?;
    let end = without_fences.rfind('}')?;
    if end < start {
        return None;
    }
    Some(without_fences[start..=end].to_string())
}

fn normalize(value: &Value) -> ModelResponse {
    let status = match value.get("status").and_then(Value::as_str) {
        Some("done") => ResponseStatus::Done,
        Some("need_user") => ResponseStatus::NeedUser,
        _ => ResponseStatus::Continue,
    };

    let assistant_message = value
        .get("assistant_message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let plan = value
        .get("plan")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .take(MAX_PLAN_STEPS)
                .collect()
        })
        .unwrap_or_default();

    let actions = value
        .get("actions")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| serde_json::from_value::<AgentAction>(v.clone()).ok())
                .take(MAX_ACTIONS)
                .collect()
        })
        .unwrap_or_default();

    let verify = value
        .get("verify")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(parse_verify_entry)
                .take(MAX_VERIFY_COMMANDS)
                .collect()
        })
        .unwrap_or_default();

    let mut question = value
        .get("question")
        .and_then(Value::as_str)
        .map(str::to_string);
    if status == ResponseStatus::NeedUser && question.is_none() {
        question = Some("Please clarify how to proceed.".to_string());
    }

    let memory_updates = value.get("memory_updates").map(parse_memory_updates);

    ModelResponse {
        status,
        assistant_message,
        plan,
        actions,
        verify,
        question,
        memory_updates,
    }
}

fn parse_verify_entry(value: &Value) -> Option<VerifyCommand> {
    match value {
        Value::String(s) => Some(VerifyCommand { command: s.clone() }),
        Value::Object(map) => map
            .get("command")
            .and_then(Value::as_str)
            .map(|s| VerifyCommand { command: s.to_string() }),
        _ => None,
    }
}

fn parse_memory_updates(value: &Value) -> MemoryUpdates {
    let string_list = |key: &str| -> Vec<String> {
        value
            .get(key)
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .take(MAX_MEMORY_UPDATE_LIST.min(MAX_LIST_ENTRIES))
                    .collect()
            })
            .unwrap_or_default()
    };

    let kv = value
        .get("kv")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .take(MAX_MEMORY_UPDATE_KV.min(MAX_KV_BATCH))
                .collect()
        })
        .unwrap_or_default();

    MemoryUpdates {
        project_rules: string_list("project_rules"),
        architecture_notes: string_list("architecture_notes"),
        common_commands: string_list("common_commands"),
        kv,
    }
}
