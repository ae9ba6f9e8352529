//! Session domain entities

use serde::{Deserialize, Serialize};

use crate::core::error::DomainError;

/// Role of a message in a conversation.
///
/// Inbound history is restricted to `User` and `Assistant`; `System`
/// messages are synthesized by the pipeline, never accepted from callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Parse an inbound history role. Only `user` and `assistant` are
    /// accepted; `system` is rejected like any other unknown role.
    pub fn parse(role: &str) -> Result<Self, DomainError> {
        match role {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(DomainError::InvalidRole(other.to_string())),
        }
    }
}

/// A message in a conversation (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Keywords that flag a query as database-related.
///
/// Matched against whitespace/punctuation-separated words of the
/// lowercased query; multi-word entries are matched as phrases.
const DATABASE_KEYWORDS: &[&str] = &[
    "db",
    "database",
    "databases",
    "collection",
    "collections",
    "find",
    "aggregate",
    "count",
    "index",
    "indexes",
    "schema",
    "stats",
    "log",
    "logs",
    "explain",
    "collstats",
    "perf",
    "performance",
    "mongodb",
    "mongo",
];

const DATABASE_PHRASES: &[&str] = &["storage size", "size on disk"];

/// Keywords that request a tabular answer layout.
const TABLE_KEYWORDS: &[&str] = &["table", "tabular"];

/// One user request: the raw query plus ordered prior history.
///
/// Created per request and discarded after the response is returned;
/// there is no persistence.
#[derive(Debug, Clone)]
pub struct Turn {
    pub query: String,
    pub history: Vec<ChatMessage>,
}

impl Turn {
    pub fn new(query: impl Into<String>, history: Vec<ChatMessage>) -> Self {
        Self {
            query: query.into(),
            history,
        }
    }

    /// Reject a turn whose query is empty after trimming.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.query.trim().is_empty() {
            return Err(DomainError::InvalidQuery("query is empty".to_string()));
        }
        Ok(())
    }

    /// Lexical predicate: does the query look like it is about the
    /// database? Drives the execution loop's tool-use nudge retry.
    pub fn looks_database_related(&self) -> bool {
        let lower = self.query.to_ascii_lowercase();
        if DATABASE_PHRASES.iter().any(|p| lower.contains(p)) {
            return true;
        }
        lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| DATABASE_KEYWORDS.contains(&word))
    }

    /// Does the query ask for a tabular layout?
    pub fn wants_table(&self) -> bool {
        let lower = self.query.to_ascii_lowercase();
        lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| TABLE_KEYWORDS.contains(&word))
    }

    /// History plus the current query as an ordered message list.
    pub fn messages(&self) -> Vec<ChatMessage> {
        let mut messages = self.history.clone();
        messages.push(ChatMessage::user(self.query.clone()));
        messages
    }
}
