//! Model value object representing an LLM model identifier

use serde::{Deserialize, Serialize};

/// Identifier of the text-generation model used for a turn (Value Object).
///
/// mongochat talks to an OpenAI-compatible chat-completions endpoint, so
/// the identifier is an opaque string chosen by configuration rather than
/// a closed enum; the pipeline never branches on the model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(String);

impl Model {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Model {
    fn default() -> Self {
        Self("gpt-4o-mini".to_string())
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_inner() {
        let model = Model::new("gpt-4o");
        assert_eq!(model.to_string(), "gpt-4o");
        assert_eq!(model.as_str(), "gpt-4o");
    }

    #[test]
    fn default_is_non_empty() {
        assert!(!Model::default().as_str().is_empty());
    }
}
