//! Chat endpoint: JSON request/response plus NDJSON streaming.
//!
//! `POST /api/chat` accepts `{query, messages, stream?}`. The
//! non-streaming form replies with the full turn outcome; the streaming
//! form replies with newline-delimited JSON events of types `meta`,
//! `content`, `reasoning`, `done`, and `error`.

use std::convert::Infallible;
use std::sync::Mutex;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use mongochat_application::{ChatProgress, RunTurnError, RunTurnInput};
use mongochat_domain::{ChatMessage, Role, ToolCallRecord, Turn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    /// Prior conversation, oldest first.
    #[serde(default)]
    pub messages: Vec<HistoryMessage>,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub planned_tools: Vec<String>,
    pub tool_calls: Vec<ToolCallRecord>,
    /// Normalized renderings of each tool result.
    pub tool_results: Vec<String>,
}

/// Convert the request into a domain turn, rejecting unknown roles.
fn build_turn(request: &ChatRequest) -> Result<Turn, ApiError> {
    let mut history = Vec::with_capacity(request.messages.len());
    for message in &request.messages {
        let role = Role::parse(&message.role).map_err(|e| ApiError(e.into()))?;
        history.push(ChatMessage {
            role,
            content: message.content.clone(),
        });
    }
    Ok(Turn::new(request.query.clone(), history))
}

pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    let turn = match build_turn(&request) {
        Ok(turn) => turn,
        Err(e) => return e.into_response(),
    };
    if request.stream {
        stream_chat(state, turn).await
    } else {
        json_chat(state, turn).await
    }
}

/// Captures the planned tool names announced by the use case.
#[derive(Default)]
struct RecordingProgress {
    tools: Mutex<Vec<String>>,
}

impl ChatProgress for RecordingProgress {
    fn on_tools_selected(&self, names: &[String]) {
        match self.tools.lock() {
            Ok(mut tools) => *tools = names.to_vec(),
            Err(_) => {}
        }
    }
}

async fn json_chat(state: AppState, turn: Turn) -> Response {
    let progress = RecordingProgress::default();
    let input = RunTurnInput::new(turn, state.model.clone());

    match state.use_case.execute(input, &progress).await {
        Ok(outcome) => {
            let planned_tools = progress.tools.lock().map(|t| t.clone()).unwrap_or_default();
            Json(ChatResponse {
                result: outcome.reply.content,
                reasoning: outcome.reply.explanation,
                planned_tools,
                tool_calls: outcome.execution.tool_calls,
                tool_results: outcome.tool_summaries,
            })
            .into_response()
        }
        Err(e) => ApiError(e).into_response(),
    }
}

/// One NDJSON line.
fn event(value: serde_json::Value) -> String {
    format!("{value}\n")
}

/// Progress notifier that forwards events onto the NDJSON stream.
struct StreamingProgress {
    tx: tokio::sync::mpsc::UnboundedSender<String>,
}

impl ChatProgress for StreamingProgress {
    fn on_tools_selected(&self, names: &[String]) {
        let _ = self
            .tx
            .send(event(json!({"type": "meta", "plannedTools": names})));
    }

    fn on_tool_call(&self, name: &str) {
        let _ = self
            .tx
            .send(event(json!({"type": "meta", "toolCall": name})));
    }

    fn on_tool_result(&self, name: &str, success: bool) {
        let _ = self.tx.send(event(
            json!({"type": "meta", "toolResult": name, "ok": success}),
        ));
    }

    fn on_text(&self, text: &str) {
        let _ = self.tx.send(event(json!({"type": "content", "text": text})));
    }
}

async fn stream_chat(state: AppState, turn: Turn) -> Response {
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    let input = RunTurnInput::new(turn, state.model.clone());

    tokio::spawn(async move {
        let progress = StreamingProgress { tx: tx.clone() };
        match state.use_case.execute(input, &progress).await {
            Ok(outcome) => {
                if let Some(reasoning) = &outcome.reply.explanation {
                    let _ = tx.send(event(json!({"type": "reasoning", "text": reasoning})));
                }
                let _ = tx.send(event(json!({
                    "type": "done",
                    "result": outcome.reply.content,
                    "toolCalls": outcome.execution.tool_calls.len(),
                })));
            }
            Err(e) => {
                debug!("Streaming turn failed: {e}");
                let _ = tx.send(event(json!({
                    "type": "error",
                    "message": e.to_string(),
                })));
            }
        }
    });

    let body = Body::from_stream(
        UnboundedReceiverStream::new(rx).map(|line| Ok::<_, Infallible>(line)),
    );
    Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .body(body)
        .unwrap_or_else(|_| ApiError(RunTurnError::Execution("stream setup".into())).into_response())
}
