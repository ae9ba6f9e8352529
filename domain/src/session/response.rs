//! Structured model responses for the native tool-use loop.
//!
//! A generation call returns an ordered list of content blocks mixing
//! text and tool-use requests. `stop_reason` tells the execution loop
//! whether to hand tool results back (`ToolUse`) or stop (`EndTurn`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::tool::records::ToolCallRecord;

/// A single block of content within a model response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// A text content block from the model.
    Text(String),

    /// A tool invocation requested by the model.
    ToolUse {
        /// API-assigned ID used to correlate the tool result.
        id: String,
        /// Tool name as issued by the model (not yet validated).
        name: String,
        /// Structured arguments for the tool.
        input: HashMap<String, serde_json::Value>,
    },
}

impl ContentBlock {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of response.
    EndTurn,
    /// The model wants tools executed and their results returned.
    ToolUse,
    /// Token limit reached; the text may be truncated.
    MaxTokens,
    /// Provider-specific stop reason.
    Other(String),
}

/// A structured response from one generation call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<StopReason>,
}

impl LlmResponse {
    /// Wrap a plain text reply (for calls issued without tools).
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text(text.into())],
            stop_reason: Some(StopReason::EndTurn),
        }
    }

    /// Concatenate all text blocks into a single string.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| b.as_text())
            .collect::<Vec<_>>()
            .join("")
    }

    /// Extract all tool-use blocks as call records, preserving order.
    pub fn tool_calls(&self) -> Vec<ToolCallRecord> {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { id, name, input } => Some(ToolCallRecord {
                    call_id: id.clone(),
                    name: name.clone(),
                    arguments: serde_json::Value::Object(
                        input.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
                    ),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn has_tool_calls(&self) -> bool {
        self.content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_is_text_only() {
        let response = LlmResponse::from_text("Hello");
        assert_eq!(response.text_content(), "Hello");
        assert!(!response.has_tool_calls());
        assert_eq!(response.stop_reason, Some(StopReason::EndTurn));
    }

    #[test]
    fn tool_calls_preserve_order_and_arguments() {
        let response = LlmResponse {
            content: vec![
                ContentBlock::Text("Checking...".to_string()),
                ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "mongodb.list-databases".to_string(),
                    input: HashMap::new(),
                },
                ContentBlock::ToolUse {
                    id: "call_2".to_string(),
                    name: "mongodb.find".to_string(),
                    input: [("collection".to_string(), serde_json::json!("users"))]
                        .into_iter()
                        .collect(),
                },
            ],
            stop_reason: Some(StopReason::ToolUse),
        };

        let calls = response.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "mongodb.list-databases");
        assert_eq!(calls[1].call_id, "call_2");
        assert_eq!(calls[1].arguments["collection"], "users");
        assert_eq!(response.text_content(), "Checking...");
    }
}
