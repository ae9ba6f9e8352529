//! LLM provider adapters

pub mod gateway;

pub use gateway::OpenAiGateway;
