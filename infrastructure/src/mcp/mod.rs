//! MCP tool-server adapter (stdio JSON-RPC)

pub mod error;
pub mod protocol;
pub mod provider;
pub mod transport;

pub use error::McpError;
pub use provider::{McpToolProvider, McpToolSession};
