//! Chat Client contract: bearer-auth POST to an OpenAI-compatible
//! `/chat/completions` endpoint, JSON body, `choices[0].message.content`
//! extraction. No provider failover or model rotation — this client
//! talks to the single configured model and retries once without the
//! JSON-object response-format hint when the provider rejects it.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use va_core::chat::{ChatMessage, Role};
use va_core::error::AgentError;

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        timeout: Duration,
    ) -> Result<String, AgentError>;
}

pub struct OpenAiCompatClient {
    base_url: String,
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn send(&self, body: &Value, timeout: Duration) -> Result<String, AgentError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = tokio::time::timeout(
            timeout,
            self.http
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(body)
                .send(),
        )
        .await
        .map_err(|_| AgentError::ModelIo("request timed out".to_string()))?
        .map_err(|e| AgentError::ModelIo(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AgentError::ModelIo(e.to_string()))?;

        if !status.is_success() {
            return Err(AgentError::ModelIo(format!(
                "status {status}: {text}"
            )));
        }

        let content = extract_completion_content(&text)
            .ok_or_else(|| AgentError::ModelIo("missing choices[0].message.content".to_string()))?;

        if content.trim().is_empty() {
            return Err(AgentError::ModelIo("empty completion content".to_string()));
        }
        Ok(content)
    }
}

#[async_trait]
impl ChatClient for OpenAiCompatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        timeout: Duration,
    ) -> Result<String, AgentError> {
        let body = build_request_body(&self.model, messages, true);
        match self.send(&body, timeout).await {
            Ok(content) => Ok(content),
            Err(e) if mentions_response_format(&e) => {
                let fallback = build_request_body(&self.model, messages, false);
                self.send(&fallback, timeout).await
            }
            Err(e) => Err(e),
        }
    }
}

fn build_request_body(model: &str, messages: &[ChatMessage], json_mode: bool) -> Value {
    let wire_messages: Vec<Value> = messages
        .iter()
        .map(|m| {
            json!({
                "role": role_str(m.role),
                "content": m.content,
            })
        })
        .collect();

    let mut body = json!({
        "model": model,
        "messages": wire_messages,
    });
    if json_mode {
        body["response_format"] = json!({"type": "json_object"});
    }
    body
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn mentions_response_format(error: &AgentError) -> bool {
    error.to_string().contains("response_format")
}

fn extract_completion_content(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}
