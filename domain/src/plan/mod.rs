//! Tool planning: parsing the planner's JSON contract and filtering a
//! plan against the visible tool set.
//!
//! The planner is asked to reply with nothing but
//! `{"tools":[{"name":"<exact-tool-name>","why":"<short>"}]}`. Parsing
//! tolerates a fenced code block around the object and degrades to an
//! empty plan on any malformed reply; the planner must never abort a
//! turn.

use std::collections::BTreeSet;

use crate::tool::catalog::ToolCatalog;

/// Deduplicated set of tool names proposed by the planner for a turn.
///
/// Insertion order is irrelevant; names are validated against the
/// visible tool set at parse time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    names: BTreeSet<String>,
}

impl Plan {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }
}

impl<S: Into<String>> FromIterator<S> for Plan {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parse the planner's reply into a validated plan.
///
/// Names that are not keys of `visible` are dropped (typo/hallucination
/// guard). Any parse failure yields an empty plan.
pub fn parse_planner_reply(reply: &str, visible: &ToolCatalog) -> Plan {
    let Some(json) = parse_reply_json(reply) else {
        return Plan::empty();
    };

    let Some(tools) = json.get("tools").and_then(|v| v.as_array()) else {
        return Plan::empty();
    };

    tools
        .iter()
        .filter_map(|entry| entry.get("name").and_then(|n| n.as_str()))
        .filter(|name| !name.is_empty() && visible.contains(name))
        .collect()
}

fn parse_reply_json(reply: &str) -> Option<serde_json::Value> {
    let trimmed = reply.trim();

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return value.is_object().then_some(value);
    }

    // Tolerate a ```json fence around the object.
    let rest = trimmed.strip_prefix("```")?;
    let body_start = rest.find('\n')? + 1;
    let body = &rest[body_start..];
    let end = body.rfind("```")?;
    let value = serde_json::from_str::<serde_json::Value>(body[..end].trim()).ok()?;
    value.is_object().then_some(value)
}

/// Intersect a plan with the visible tool set, failing open.
///
/// An empty plan, or a plan whose intersection with the visible set is
/// empty, returns the full visible set: starving the agent of discovery
/// tools is worse than exposing tools the planner did not ask for. This
/// deliberately means the planner can never reduce exposure below the
/// visibility gate's output. The gate is the only security boundary.
pub fn filter_plan(visible: &ToolCatalog, plan: &Plan) -> ToolCatalog {
    if plan.is_empty() {
        return visible.clone();
    }
    let subset = visible.restrict_to(plan.names());
    if subset.is_empty() {
        return visible.clone();
    }
    subset
}
