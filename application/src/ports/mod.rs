//! Port definitions (interfaces to the outside world)

pub mod llm_gateway;
pub mod progress;
pub mod tool_provider;
