//! OpenAI-compatible chat-completions adapter for the LLM gateway port.
//!
//! Each session holds the wire-format message list and appends to it on
//! every send, so multi-turn tool loops replay the full conversation to
//! the (stateless) completions endpoint.
//!
//! Tool names are namespaced `<provider>.<tool>` in the catalog, but the
//! completions API forbids `.` in function names, so names are sent with
//! `.` rewritten to `__` and mapped back when the model calls them.

use std::collections::HashMap;

use async_trait::async_trait;
use mongochat_application::ports::llm_gateway::{
    GatewayError, LlmGateway, LlmSession, ToolResultMessage,
};
use mongochat_domain::{ChatMessage, ContentBlock, LlmResponse, Model, Role, StopReason, ToolDescriptor};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::file_config::LlmConfig;

/// Gateway for OpenAI-compatible chat-completions endpoints.
pub struct OpenAiGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiGateway {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Build from config, reading the API key from the configured
    /// environment variable. A missing key is a startup error.
    pub fn from_config(config: &LlmConfig) -> Result<Self, GatewayError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            GatewayError::SessionError(format!(
                "environment variable {} is not set",
                config.api_key_env
            ))
        })?;
        Ok(Self::new(config.base_url.clone(), api_key))
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn create_session_with_history(
        &self,
        model: &Model,
        system_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        let mut messages = vec![json!({"role": "system", "content": system_prompt})];
        for message in history {
            messages.push(json!({
                "role": role_str(&message.role),
                "content": message.content,
            }));
        }
        Ok(Box::new(OpenAiSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: model.clone(),
            state: Mutex::new(SessionState {
                messages,
                tools: Vec::new(),
                names: HashMap::new(),
            }),
        }))
    }
}

struct SessionState {
    /// Wire-format conversation so far, system prompt included.
    messages: Vec<Value>,
    /// Wire-format tool schemas attached to follow-up calls.
    tools: Vec<Value>,
    /// Sanitized name -> catalog name.
    names: HashMap<String, String>,
}

struct OpenAiSession {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: Model,
    state: Mutex<SessionState>,
}

impl OpenAiSession {
    async fn complete(&self, state: &SessionState) -> Result<Value, GatewayError> {
        let mut body = json!({
            "model": self.model.as_str(),
            "messages": state.messages,
        });
        if !state.tools.is_empty() {
            body["tools"] = Value::Array(state.tools.clone());
        }

        debug!(
            "Completions request: model={}, {} message(s), {} tool(s)",
            self.model,
            state.messages.len(),
            state.tools.len()
        );
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;
        if !status.is_success() {
            return Err(GatewayError::RequestFailed(format!(
                "HTTP {status}: {payload}"
            )));
        }
        Ok(payload)
    }

    /// Issue the request with the current state, record the assistant
    /// message, and return its structured form.
    async fn exchange(&self, state: &mut SessionState) -> Result<LlmResponse, GatewayError> {
        let payload = self.complete(state).await?;
        let (wire_message, response) = parse_choice(&payload, &state.names)?;
        state.messages.push(wire_message);
        Ok(response)
    }
}

#[async_trait]
impl LlmSession for OpenAiSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        let mut state = self.state.lock().await;
        state.messages.push(json!({"role": "user", "content": content}));
        let response = self.exchange(&mut state).await?;
        Ok(response.text_content())
    }

    async fn send_with_tools(
        &self,
        content: &str,
        tools: &[ToolDescriptor],
    ) -> Result<LlmResponse, GatewayError> {
        let mut state = self.state.lock().await;
        state.names = tools
            .iter()
            .map(|tool| (sanitize_name(&tool.name), tool.name.clone()))
            .collect();
        state.tools = tools.iter().map(tool_to_wire).collect();
        state.messages.push(json!({"role": "user", "content": content}));
        self.exchange(&mut state).await
    }

    async fn send_tool_results(
        &self,
        results: &[ToolResultMessage],
    ) -> Result<LlmResponse, GatewayError> {
        let mut state = self.state.lock().await;
        for result in results {
            state.messages.push(json!({
                "role": "tool",
                "tool_call_id": result.tool_use_id,
                "content": result.output,
            }));
        }
        self.exchange(&mut state).await
    }
}

fn role_str(role: &Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// The completions API restricts function names to `[a-zA-Z0-9_-]`.
fn sanitize_name(name: &str) -> String {
    name.replace('.', "__")
}

fn tool_to_wire(tool: &ToolDescriptor) -> Value {
    let parameters = if tool.input_schema.is_object() {
        tool.input_schema.clone()
    } else {
        json!({"type": "object", "properties": {}})
    };
    json!({
        "type": "function",
        "function": {
            "name": sanitize_name(&tool.name),
            "description": tool.description,
            "parameters": parameters,
        }
    })
}

/// Parse `choices[0]` into the assistant wire message (to replay in the
/// next request) and the port-level response.
fn parse_choice(
    payload: &Value,
    names: &HashMap<String, String>,
) -> Result<(Value, LlmResponse), GatewayError> {
    let choice = payload
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| GatewayError::RequestFailed(format!("no choices in response: {payload}")))?;
    let message = choice
        .get("message")
        .ok_or_else(|| GatewayError::RequestFailed("choice without message".to_string()))?;

    let mut content = Vec::new();
    if let Some(text) = message.get("content").and_then(|c| c.as_str()) {
        if !text.is_empty() {
            content.push(ContentBlock::Text(text.to_string()));
        }
    }
    if let Some(calls) = message.get("tool_calls").and_then(|c| c.as_array()) {
        for call in calls {
            let id = call
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let function = call.get("function").cloned().unwrap_or(Value::Null);
            let wire_name = function
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            let name = names
                .get(wire_name)
                .cloned()
                .unwrap_or_else(|| wire_name.replace("__", "."));
            let arguments = function
                .get("arguments")
                .and_then(|v| v.as_str())
                .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
                .unwrap_or_else(|| json!({}));
            let input: HashMap<String, Value> = match arguments {
                Value::Object(map) => map.into_iter().collect(),
                _ => HashMap::new(),
            };
            content.push(ContentBlock::ToolUse { id, name, input });
        }
    }

    let stop_reason = choice
        .get("finish_reason")
        .and_then(|v| v.as_str())
        .map(|reason| match reason {
            "stop" => StopReason::EndTurn,
            "tool_calls" => StopReason::ToolUse,
            "length" => StopReason::MaxTokens,
            other => StopReason::Other(other.to_string()),
        });

    Ok((message.clone(), LlmResponse { content, stop_reason }))
}
