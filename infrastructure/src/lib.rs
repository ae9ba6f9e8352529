//! Infrastructure layer for mongochat
//!
//! This crate contains adapters for external systems: the LLM provider,
//! the MCP tool server, configuration loading, and guidance files.
//! It implements the ports defined in the application layer.

pub mod config;
pub mod guidance;
pub mod llm;
pub mod mcp;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig};
pub use guidance::load_guidance;
pub use llm::OpenAiGateway;
pub use mcp::{McpError, McpToolProvider};
