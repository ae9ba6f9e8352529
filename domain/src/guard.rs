//! Detection of minimal final answers and the deterministic fallback
//! built from tool results when narration cannot be obtained.

use serde_json::Value;

use crate::normalize::payload::{extract_documents, has_identifier, text_fragments};
use crate::tool::records::ToolResultRecord;

/// Answers shorter than this are treated as degenerate.
pub const MIN_SUBSTANTIVE_LEN: usize = 20;

/// Low-content tokens that never constitute an answer on their own.
const FILLER_TOKENS: &[&str] = &["done", "done.", "completed", "finished", "ok", "okay"];

/// Fallback shows at most this many documents.
const FALLBACK_DOC_LIMIT: usize = 3;

/// True when the final text is too minimal to convey the outcome of a
/// successful tool execution.
pub fn is_degenerate(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.len() < MIN_SUBSTANTIVE_LEN {
        return true;
    }
    let folded = trimmed.to_lowercase();
    FILLER_TOKENS.contains(&folded.as_str())
}

/// Build a deterministic summary of tool results.
///
/// Document-bearing payloads are summarized as a count plus a short
/// preview; otherwise any recoverable text fragments are concatenated.
/// Returns `None` when the results yield nothing to say, in which case
/// the caller keeps the original text.
pub fn fallback_summary(results: &[ToolResultRecord]) -> Option<String> {
    if results.is_empty() {
        return None;
    }

    let documents: Vec<Value> = results
        .iter()
        .flat_map(|result| extract_documents(&result.payload))
        .filter(has_identifier)
        .collect();
    if !documents.is_empty() {
        let mut out = format!("Found {} document(s).", documents.len());
        for doc in documents.iter().take(FALLBACK_DOC_LIMIT) {
            let pretty = serde_json::to_string_pretty(doc).unwrap_or_else(|_| doc.to_string());
            out.push_str(&format!("\n```json\n{pretty}\n```"));
        }
        if documents.len() > FALLBACK_DOC_LIMIT {
            out.push_str(&format!(
                "\nShowing up to {FALLBACK_DOC_LIMIT} of {}.",
                documents.len()
            ));
        }
        return Some(out);
    }

    let fragments: Vec<String> = results
        .iter()
        .flat_map(|result| {
            let texts = text_fragments(&result.payload);
            if texts.is_empty() {
                match &result.payload {
                    Value::String(s) => vec![s.clone()],
                    Value::Null => Vec::new(),
                    other => vec![other.to_string()],
                }
            } else {
                texts
            }
        })
        .filter(|text| !text.trim().is_empty())
        .collect();
    if fragments.is_empty() {
        return None;
    }
    Some(fragments.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(name: &str, payload: Value) -> ToolResultRecord {
        ToolResultRecord {
            name: name.to_string(),
            payload,
        }
    }

    #[test]
    fn filler_tokens_and_short_text_are_degenerate() {
        assert!(is_degenerate("Done."));
        assert!(is_degenerate("  OK  "));
        assert!(is_degenerate("finished"));
        assert!(is_degenerate("short"));
        assert!(!is_degenerate(
            "The orders collection contains 42 documents in total."
        ));
    }

    #[test]
    fn fallback_counts_documents_with_identifiers() {
        let results = vec![result(
            "find",
            json!({"documents": [
                {"_id": 1, "name": "a"},
                {"_id": 2, "name": "b"},
                {"_id": 3, "name": "c"},
                {"_id": 4, "name": "d"},
            ]}),
        )];
        let summary = fallback_summary(&results).unwrap();
        assert!(summary.starts_with("Found 4 document(s)."));
        assert!(summary.contains("Showing up to 3 of 4."));
    }

    #[test]
    fn fallback_concatenates_text_fragments() {
        let results = vec![result(
            "logs",
            json!({"content": [
                {"type": "text", "text": "slow query on orders"},
                {"type": "text", "text": "index build finished"},
            ]}),
        )];
        let summary = fallback_summary(&results).unwrap();
        assert_eq!(summary, "slow query on orders\nindex build finished");
    }

    #[test]
    fn fallback_is_none_without_results_or_content() {
        assert_eq!(fallback_summary(&[]), None);
        assert_eq!(fallback_summary(&[result("noop", Value::Null)]), None);
    }
}
