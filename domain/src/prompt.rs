//! Prompt templates for each stage of a chat turn

use crate::tool::records::ToolResultRecord;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the primary chat call.
    ///
    /// `guidance` carries optional operator-supplied instructions
    /// appended verbatim (loaded from a guidance file at startup).
    pub fn chat_system(guidance: Option<&str>) -> String {
        let mut prompt = String::from(
            r#"You are a MongoDB assistant. Answer the user's question, using the attached
database tools when they help. Keep answers grounded in actual tool output;
never invent database contents.

Reply with a single JSON object of the form:
{"content": "<the answer shown to the user>", "explanation": "<brief reasoning, optional>"}
The "explanation" field may be omitted. Do not wrap the object in markdown fences."#,
        );
        if let Some(extra) = guidance {
            let extra = extra.trim();
            if !extra.is_empty() {
                prompt.push_str("\n\nAdditional instructions:\n");
                prompt.push_str(extra);
            }
        }
        prompt
    }

    /// System prompt for the planning call. No tools are attached; the
    /// model only names which of the listed tools are relevant.
    pub fn planner_system() -> &'static str {
        r#"You select database tools for a user request. You must not call any tool.
Reply with only a JSON object of the form:
{"tools": [{"name": "<tool name>", "why": "<one short reason>"}]}
Choose the smallest set of tools that could answer the request. If none apply,
reply with {"tools": []}."#
    }

    /// User prompt for the planning call.
    pub fn planner_query(query: &str, visible_names: &[String]) -> String {
        let mut prompt = format!(
            r#"User request: {query}

Available tools:
"#
        );
        for name in visible_names {
            prompt.push_str(&format!("- {name}\n"));
        }
        prompt.push_str("\nWhich tools are relevant? Reply with the JSON object only.");
        prompt
    }

    /// Reminder sent once when the reply to a database-looking query
    /// contains no tool activity.
    pub fn database_nudge(query: &str) -> String {
        format!(
            r#"The question below concerns the connected MongoDB deployment. Answer it by
calling the attached database tools rather than from general knowledge.

{query}"#
        )
    }

    /// System prompt for the narration retry: no tools, narrate what
    /// the tools already returned.
    pub fn narration_system() -> &'static str {
        r#"You are summarizing the results of database operations that already ran.
Do not call any tool. Describe the results below in clear natural language,
including concrete names and numbers from the data. Reply with plain text."#
    }

    /// User prompt for the narration retry, embedding the serialized
    /// tool results verbatim.
    pub fn narration_query(query: &str, results: &[ToolResultRecord]) -> String {
        let mut prompt = format!(
            r#"Original question: {query}

Tool results:
"#
        );
        for result in results {
            let body = serde_json::to_string_pretty(&result.payload)
                .unwrap_or_else(|_| result.payload.to_string());
            prompt.push_str(&format!("\n--- {} ---\n{body}\n", result.name));
        }
        prompt.push_str("\nSummarize what these results say, for the user.");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_system_appends_guidance() {
        let bare = PromptTemplate::chat_system(None);
        assert!(bare.contains("\"content\""));
        assert!(!bare.contains("Additional instructions"));

        let with = PromptTemplate::chat_system(Some("Prefer the `app` database."));
        assert!(with.contains("Additional instructions"));
        assert!(with.contains("Prefer the `app` database."));

        let blank = PromptTemplate::chat_system(Some("   "));
        assert!(!blank.contains("Additional instructions"));
    }

    #[test]
    fn planner_query_lists_tools() {
        let names = vec!["mongo.find".to_string(), "mongo.count".to_string()];
        let prompt = PromptTemplate::planner_query("how many users?", &names);
        assert!(prompt.contains("- mongo.find"));
        assert!(prompt.contains("- mongo.count"));
        assert!(prompt.contains("how many users?"));
    }

    #[test]
    fn narration_query_embeds_results() {
        let results = vec![ToolResultRecord {
            name: "mongo.count".to_string(),
            payload: json!({"count": 42}),
        }];
        let prompt = PromptTemplate::narration_query("how many users?", &results);
        assert!(prompt.contains("--- mongo.count ---"));
        assert!(prompt.contains("42"));
    }
}
