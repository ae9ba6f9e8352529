//! Tool catalog entities.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptor of one externally invocable tool.
///
/// The schema is carried opaquely: the domain never interprets it, it is
/// forwarded verbatim to the model as the tool's parameter schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique name within a turn. Namespaced `<provider>.<tool>` when
    /// multiple providers are aggregated.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON schema of the tool's input, as declared by the provider.
    pub input_schema: serde_json::Value,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Immutable per-turn snapshot of available tools, keyed by unique name.
///
/// `BTreeMap` keeps iteration order stable, which keeps tool schemas,
/// plans, and rendered summaries deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCatalog {
    tools: BTreeMap<String, ToolDescriptor>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tool: ToolDescriptor) {
        self.tools.insert(tool.name.clone(), tool);
    }

    pub fn with(mut self, tool: ToolDescriptor) -> Self {
        self.insert(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Sub-catalog restricted to entries whose name satisfies `keep`.
    pub fn retain_by_name(&self, keep: impl Fn(&str) -> bool) -> Self {
        Self {
            tools: self
                .tools
                .iter()
                .filter(|(name, _)| keep(name))
                .map(|(name, tool)| (name.clone(), tool.clone()))
                .collect(),
        }
    }

    /// Sub-catalog restricted to the given names; unknown names are
    /// silently ignored.
    pub fn restrict_to<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut subset = Self::new();
        for name in names {
            if let Some(tool) = self.tools.get(name) {
                subset.insert(tool.clone());
            }
        }
        subset
    }
}

impl FromIterator<ToolDescriptor> for ToolCatalog {
    fn from_iter<I: IntoIterator<Item = ToolDescriptor>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for tool in iter {
            catalog.insert(tool);
        }
        catalog
    }
}
