//! LLM Gateway port
//!
//! Defines the interface for communicating with text-generation providers.

use async_trait::async_trait;
use mongochat_domain::{ChatMessage, LlmResponse, Model, ToolDescriptor};
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Cancelled")]
    Cancelled,

    #[error("Other error: {0}")]
    Other(String),
}

/// Result of one tool invocation, sent back into the conversation.
#[derive(Debug, Clone)]
pub struct ToolResultMessage {
    /// Provider-native id of the tool call being answered.
    pub tool_use_id: String,
    pub tool_name: String,
    /// Serialized tool output (or error message).
    pub output: String,
    pub is_error: bool,
}

/// Gateway for LLM communication
///
/// This port defines how the application layer talks to text-generation
/// providers. Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Create a new session with the given model and system prompt.
    async fn create_session(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        self.create_session_with_history(model, system_prompt, &[])
            .await
    }

    /// Create a new session seeded with prior conversation history.
    async fn create_session_with_history(
        &self,
        model: &Model,
        system_prompt: &str,
        history: &[ChatMessage],
    ) -> Result<Box<dyn LlmSession>, GatewayError>;
}

/// An active LLM session.
///
/// A session accumulates conversation state: each `send*` call appends to
/// the session's message history before issuing the generation request.
#[async_trait]
pub trait LlmSession: Send + Sync {
    /// Get the model used by this session
    fn model(&self) -> &Model;

    /// Send a message and get a plain-text response. No tools attached.
    async fn send(&self, content: &str) -> Result<String, GatewayError>;

    /// Send a message with a tool set attached. The model may answer with
    /// text, tool calls, or both.
    async fn send_with_tools(
        &self,
        content: &str,
        tools: &[ToolDescriptor],
    ) -> Result<LlmResponse, GatewayError>;

    /// Send tool results back into the conversation and get the model's
    /// continuation.
    async fn send_tool_results(
        &self,
        results: &[ToolResultMessage],
    ) -> Result<LlmResponse, GatewayError>;
}
