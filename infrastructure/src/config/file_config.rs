//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into layer-specific
//! settings where needed.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use mongochat_application::config::ExecutionParams;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// LLM provider settings
    pub llm: LlmConfig,
    /// MCP tool-server settings
    pub mcp: McpServerConfig,
    /// Turn execution settings
    pub execution: ExecutionConfig,
    /// Optional operator guidance appended to the system prompt
    pub guidance: GuidanceConfig,
}

impl FileConfig {
    pub fn execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_max_roundtrips(self.execution.max_roundtrips)
            .with_timeout(Duration::from_millis(self.execution.timeout_ms))
            .with_session_ttl(Duration::from_secs(self.execution.session_ttl_secs))
    }
}

/// HTTP server configuration (`[server]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// LLM provider configuration (`[llm]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible completions endpoint.
    pub base_url: String,
    /// Environment variable name for the API key.
    pub api_key_env: String,
    /// Model used for all generation calls.
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

/// MCP tool-server configuration (`[mcp]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct McpServerConfig {
    /// Command spawned as the MCP server process.
    pub command: String,
    pub args: Vec<String>,
    /// Extra environment for the child (e.g. MDB_MCP_CONNECTION_STRING).
    pub env: HashMap<String, String>,
    /// Prefix for catalog tool names.
    pub namespace: String,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            command: "npx".to_string(),
            args: vec!["-y".to_string(), "mongodb-mcp-server".to_string()],
            env: HashMap::new(),
            namespace: "mongodb".to_string(),
        }
    }
}

/// Turn execution configuration (`[execution]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Maximum tool-call/tool-result round trips per turn.
    pub max_roundtrips: usize,
    /// Wall-clock budget for the primary generation call, in milliseconds.
    pub timeout_ms: u64,
    /// Freshness window for the cached MCP session, in seconds.
    pub session_ttl_secs: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_roundtrips: 8,
            timeout_ms: 40_000,
            session_ttl_secs: 300,
        }
    }
}

/// Guidance file configuration (`[guidance]` section)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceConfig {
    /// Path to a plain-text file with extra system-prompt instructions.
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = FileConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.mcp.namespace, "mongodb");
        assert_eq!(
            config.execution_params().timeout,
            Duration::from_secs(40)
        );
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [mcp]
            command = "mongodb-mcp-server"
            args = []

            [mcp.env]
            MDB_MCP_CONNECTION_STRING = "mongodb://localhost:27017"

            [execution]
            timeout_ms = 15000
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.mcp.command, "mongodb-mcp-server");
        assert_eq!(
            config.mcp.env.get("MDB_MCP_CONNECTION_STRING").unwrap(),
            "mongodb://localhost:27017"
        );
        assert_eq!(config.execution.max_roundtrips, 8);
        assert_eq!(
            config.execution_params().timeout,
            Duration::from_secs(15)
        );
    }
}
