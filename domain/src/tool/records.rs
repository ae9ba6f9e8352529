//! Execution result records.
//!
//! One primary generation call produces final text plus ordered lists of
//! the tool calls the model issued and the raw payloads the provider
//! returned. Once a round completes, every call record has a matching
//! result record; a timeout abandons the whole turn instead of leaving
//! the lists out of step.

use serde::{Deserialize, Serialize};

/// A tool invocation as issued by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// API-assigned ID correlating this call with its result.
    pub call_id: String,
    /// Tool name as issued (validated against the catalog before use).
    pub name: String,
    /// Arguments exactly as issued.
    pub arguments: serde_json::Value,
}

/// The raw, opaque payload a provider returned for one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultRecord {
    pub name: String,
    /// Provider payload, shape unknown; decoded later by the normalizer.
    pub payload: serde_json::Value,
}

/// The outcome of the primary generation call.
#[derive(Debug, Clone, Default)]
pub struct Execution {
    /// Final text, possibly empty.
    pub text: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub tool_results: Vec<ToolResultRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_serialize_with_raw_payloads() {
        let record = ToolResultRecord {
            name: "mongodb.count".to_string(),
            payload: serde_json::json!({"count": 42}),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["payload"]["count"], 42);
    }
}
