//! Domain layer for mongochat
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Turn
//!
//! One user query plus its conversation history, processed end-to-end by
//! the pipeline: visibility gate → planner → plan filter → execution loop
//! → degenerate-output guard → normalizer.
//!
//! ## Tool Catalog
//!
//! An immutable per-turn snapshot of the tools exposed by the MCP
//! provider. The domain never mutates descriptors, it only filters the
//! catalog by name (mutation suppression, plan intersection).
//!
//! ## Normalization
//!
//! Tool results arrive as loosely-structured payloads whose shape varies
//! per tool. The normalizer classifies each result once by tool name and
//! decodes it into a canonical value that can be rendered as prose or a
//! markdown table. Decoding is lossy-tolerant: unknown shapes degrade to
//! a textual echo, never an error.

pub mod core;
pub mod guard;
pub mod normalize;
pub mod plan;
pub mod prompt;
pub mod session;
pub mod tool;

// Re-export commonly used types
pub use core::{error::DomainError, model::Model};
pub use guard::{fallback_summary, is_degenerate};
pub use normalize::{
    category::{CategoryTable, ToolCategory},
    payload::{DatabaseEntry, IndexEntry, NormalizedResult, WriteAck, normalize_payload},
    render::{human_bytes, render},
};
pub use plan::{Plan, filter_plan, parse_planner_reply};
pub use prompt::PromptTemplate;
pub use session::{
    entities::{ChatMessage, Role, Turn},
    reply::{ReplyAnomaly, SplitReply},
    response::{ContentBlock, LlmResponse, StopReason},
};
pub use tool::{
    catalog::{ToolCatalog, ToolDescriptor},
    records::{Execution, ToolCallRecord, ToolResultRecord},
    visibility::visible_tools,
};
