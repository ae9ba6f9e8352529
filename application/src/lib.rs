//! Application layer for mongochat
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod session_manager;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    llm_gateway::{GatewayError, LlmGateway, LlmSession, ToolResultMessage},
    progress::{ChatProgress, NoChatProgress},
    tool_provider::{ProviderError, ToolProvider, ToolSession},
};
pub use session_manager::SessionManager;
pub use use_cases::plan_tools::PlanToolsUseCase;
pub use use_cases::run_turn::{RunTurnError, RunTurnInput, RunTurnUseCase, TurnOutcome};
