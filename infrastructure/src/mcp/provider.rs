//! MCP adapter for the application's tool-provider port.
//!
//! Connects to one MCP server over stdio, performs the initialize
//! handshake, snapshots its tool list into a [`ToolCatalog`], and maps
//! `tools/call` results to raw payloads for the domain normalizer.
//! Catalog names are namespaced `<namespace>.<tool>` so they stay unique
//! if several providers are ever aggregated.

use std::sync::Arc;

use async_trait::async_trait;
use mongochat_application::ports::tool_provider::{
    ProviderError, ToolProvider, ToolSession,
};
use mongochat_domain::{ToolCatalog, ToolDescriptor};
use serde_json::json;
use tracing::{debug, info, warn};

use super::error::McpError;
use super::protocol::{CallToolResult, MCP_PROTOCOL_VERSION, ToolsListResult};
use super::transport::StdioTransport;
use crate::config::file_config::McpServerConfig;

impl From<McpError> for ProviderError {
    fn from(e: McpError) -> Self {
        match e {
            McpError::SpawnError(io) => ProviderError::Spawn(io.to_string()),
            McpError::TransportClosed => ProviderError::Closed,
            McpError::RpcError { code, message } => {
                ProviderError::Protocol(format!("rpc error {code}: {message}"))
            }
            other => ProviderError::Transport(other.to_string()),
        }
    }
}

/// Tool provider backed by a spawned MCP server process.
pub struct McpToolProvider {
    config: McpServerConfig,
}

impl McpToolProvider {
    pub fn new(config: McpServerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ToolProvider for McpToolProvider {
    async fn connect(&self) -> Result<Arc<dyn ToolSession>, ProviderError> {
        let transport =
            StdioTransport::spawn(&self.config.command, &self.config.args, &self.config.env)?;

        transport
            .request(
                "initialize",
                Some(json!({
                    "protocolVersion": MCP_PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "mongochat",
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                })),
            )
            .await?;
        transport.notify("notifications/initialized", None).await?;

        let listed = transport.request("tools/list", None).await?;
        let listed: ToolsListResult = serde_json::from_value(listed)
            .map_err(|e| ProviderError::Protocol(format!("bad tools/list result: {e}")))?;

        let namespace = self.config.namespace.clone();
        let catalog: ToolCatalog = listed
            .tools
            .into_iter()
            .map(|tool| {
                ToolDescriptor::new(
                    format!("{namespace}.{}", tool.name),
                    tool.description,
                    tool.input_schema,
                )
            })
            .collect();

        info!(
            "Connected to MCP server '{}' exposing {} tool(s)",
            namespace,
            catalog.len()
        );

        Ok(Arc::new(McpToolSession {
            transport,
            catalog,
            namespace,
        }))
    }
}

/// One established MCP session.
pub struct McpToolSession {
    transport: StdioTransport,
    catalog: ToolCatalog,
    namespace: String,
}

#[async_trait]
impl ToolSession for McpToolSession {
    fn catalog(&self) -> ToolCatalog {
        self.catalog.clone()
    }

    async fn call(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        // Strip the catalog namespace back off for the wire.
        let prefix = format!("{}.", self.namespace);
        let local = name.strip_prefix(&prefix).unwrap_or(name);

        debug!("Calling MCP tool '{local}'");
        let result = self
            .transport
            .request(
                "tools/call",
                Some(json!({"name": local, "arguments": arguments})),
            )
            .await?;

        let parsed: CallToolResult = serde_json::from_value(result.clone())
            .map_err(|e| ProviderError::Protocol(format!("bad tools/call result: {e}")))?;
        if parsed.is_error {
            let message = fragment_text(&result);
            warn!("MCP tool '{local}' reported an error: {message}");
            return Err(ProviderError::ToolFailed {
                name: name.to_string(),
                message,
            });
        }

        // Prefer structured content when the server provides it; the
        // raw result (with its content fragments) is the payload
        // otherwise, decoded downstream by the normalizer.
        match parsed.structured_content {
            Some(structured) => Ok(structured),
            None => Ok(result),
        }
    }

    async fn close(&self) -> Result<(), ProviderError> {
        self.transport.shutdown().await?;
        Ok(())
    }
}

fn fragment_text(result: &serde_json::Value) -> String {
    result
        .get("content")
        .and_then(|c| c.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "tool execution failed".to_string())
}
