//! Two-field reply contract: user-facing content plus an optional
//! side-channel explanation.
//!
//! The pipeline asks the model to wrap its final answer in a small JSON
//! object `{"content": "...", "explanation": "..."}`. Models are not
//! guaranteed to honor the contract, so parsing is best-effort: a reply
//! that is not valid contract JSON is treated as all-content with no
//! explanation. Legacy tag-delimited replies (`<EXPLANATION>...` around
//! the content) are still recovered; unbalanced tags are flagged as a
//! recoverable formatting anomaly, never an error.

use serde::Deserialize;

/// A recoverable formatting problem observed while splitting a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyAnomaly {
    /// An `<EXPLANATION>` open tag without its close tag (or vice versa).
    UnbalancedTags,
}

/// A model reply split into user-facing content and optional explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReply {
    pub content: String,
    pub explanation: Option<String>,
    pub anomaly: Option<ReplyAnomaly>,
}

#[derive(Deserialize)]
struct ReplyContract {
    content: String,
    #[serde(default)]
    explanation: Option<String>,
}

const EXPLANATION_OPEN: &str = "<EXPLANATION>";
const EXPLANATION_CLOSE: &str = "</EXPLANATION>";

impl SplitReply {
    /// Split a raw reply into content and explanation.
    ///
    /// Tries, in order: the JSON contract (raw or inside a fenced block),
    /// legacy explanation tags, then plain text.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Some(contract) = parse_contract(trimmed) {
            return Self {
                content: contract.content,
                explanation: contract
                    .explanation
                    .filter(|e| !e.trim().is_empty()),
                anomaly: None,
            };
        }

        match (trimmed.find(EXPLANATION_OPEN), trimmed.find(EXPLANATION_CLOSE)) {
            (Some(open), Some(close)) if open < close => {
                let explanation = trimmed[open + EXPLANATION_OPEN.len()..close].trim();
                let mut content = String::new();
                content.push_str(trimmed[..open].trim_end());
                let after = trimmed[close + EXPLANATION_CLOSE.len()..].trim_start();
                if !content.is_empty() && !after.is_empty() {
                    content.push('\n');
                }
                content.push_str(after);
                Self {
                    content: content.trim().to_string(),
                    explanation: (!explanation.is_empty()).then(|| explanation.to_string()),
                    anomaly: None,
                }
            }
            (None, None) => Self::all_content(trimmed),
            // One tag without the other, or close before open.
            _ => Self {
                anomaly: Some(ReplyAnomaly::UnbalancedTags),
                ..Self::all_content(trimmed)
            },
        }
    }

    fn all_content(text: &str) -> Self {
        Self {
            content: text.to_string(),
            explanation: None,
            anomaly: None,
        }
    }
}

fn parse_contract(text: &str) -> Option<ReplyContract> {
    if let Ok(contract) = serde_json::from_str::<ReplyContract>(text) {
        return Some(contract);
    }
    // The model may wrap the contract in a markdown fence.
    let inner = fenced_block(text)?;
    serde_json::from_str::<ReplyContract>(inner).ok()
}

/// Extract the body of the first fenced code block, if the whole reply
/// is such a block.
fn fenced_block(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("```")?;
    let body_start = rest.find('\n')? + 1;
    let body = &rest[body_start..];
    let end = body.rfind("```")?;
    Some(&body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_contract_is_preferred() {
        let reply = SplitReply::from_text(
            r#"{"content": "You have 3 databases.", "explanation": "Used list-databases."}"#,
        );
        assert_eq!(reply.content, "You have 3 databases.");
        assert_eq!(reply.explanation.as_deref(), Some("Used list-databases."));
        assert!(reply.anomaly.is_none());
    }

    #[test]
    fn fenced_json_contract_parses() {
        let reply = SplitReply::from_text(
            "```json\n{\"content\": \"Two collections.\", \"explanation\": \"ran list-collections\"}\n```",
        );
        assert_eq!(reply.content, "Two collections.");
        assert!(reply.explanation.is_some());
    }

    #[test]
    fn plain_text_is_all_content() {
        let reply = SplitReply::from_text("The `users` collection has 42 documents.");
        assert_eq!(reply.content, "The `users` collection has 42 documents.");
        assert!(reply.explanation.is_none());
        assert!(reply.anomaly.is_none());
    }

    #[test]
    fn legacy_tags_are_recovered() {
        let reply = SplitReply::from_text(
            "<EXPLANATION>I queried the logs.</EXPLANATION>\nHere are the last entries.",
        );
        assert_eq!(reply.content, "Here are the last entries.");
        assert_eq!(reply.explanation.as_deref(), Some("I queried the logs."));
    }

    #[test]
    fn unbalanced_tags_flag_anomaly_and_keep_text() {
        let reply = SplitReply::from_text("<EXPLANATION>half open, then the answer");
        assert!(reply.content.contains("half open"));
        assert!(reply.explanation.is_none());
        assert_eq!(reply.anomaly, Some(ReplyAnomaly::UnbalancedTags));
    }

    #[test]
    fn empty_explanation_field_becomes_none() {
        let reply = SplitReply::from_text(r#"{"content": "Done listing.", "explanation": ""}"#);
        assert_eq!(reply.content, "Done listing.");
        assert!(reply.explanation.is_none());
    }
}
