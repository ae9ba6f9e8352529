//! Tool provider port
//!
//! Defines the interface to the external tool-provider process (an MCP
//! server exposing database operations).

use async_trait::async_trait;
use mongochat_domain::ToolCatalog;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while talking to a tool provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Failed to spawn provider process: {0}")]
    Spawn(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Tool '{name}' failed: {message}")]
    ToolFailed { name: String, message: String },

    #[error("Provider session closed")]
    Closed,
}

/// Factory for tool-provider sessions.
///
/// Implementations (adapters) live in the infrastructure layer. Session
/// caching is handled above this port by [`SessionManager`](crate::session_manager::SessionManager);
/// `connect` always establishes a fresh session.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    async fn connect(&self) -> Result<std::sync::Arc<dyn ToolSession>, ProviderError>;
}

/// An established tool-provider session.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Snapshot of the tools this session exposes. Immutable per turn.
    fn catalog(&self) -> ToolCatalog;

    /// Invoke one tool by name and return its raw result payload.
    async fn call(&self, name: &str, arguments: Value) -> Result<Value, ProviderError>;

    /// Close the underlying session. Idempotent.
    async fn close(&self) -> Result<(), ProviderError>;
}
