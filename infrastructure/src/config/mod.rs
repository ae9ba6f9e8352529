//! Configuration loading and raw TOML types

pub mod file_config;
pub mod loader;

pub use file_config::{
    ExecutionConfig, FileConfig, GuidanceConfig, LlmConfig, McpServerConfig, ServerConfig,
};
pub use loader::ConfigLoader;
