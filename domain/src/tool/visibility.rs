//! Tool visibility gate: mutation suppression with explicit opt-in.
//!
//! Tools whose names denote mutating database operations are hidden from
//! the model unless the user's query carries an explicit confirmation
//! token (`confirm: true` / `confirm: yes`, case-insensitive,
//! whitespace-tolerant). Pure function of its inputs; no error paths.

use std::sync::LazyLock;

use regex::Regex;

use crate::tool::catalog::ToolCatalog;

static CONFIRM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)confirm\s*:\s*(true|yes)").expect("valid confirm pattern"));

/// Name fragments that mark a tool as mutating. Compared against the
/// hyphen/underscore-separated segments of the unnamespaced tool name so
/// that `count` is not caught by `out` and `find` is never suppressed,
/// while `drop-database` and `insert-many` are.
const MUTATING_TOKENS: &[&str] = &[
    "insert",
    "update",
    "delete",
    "create-index",
    "drop",
    "write",
    "bulk",
    "merge",
    "out",
];

/// True when the query contains an explicit confirmation token.
pub fn has_confirmation(query: &str) -> bool {
    CONFIRM_TOKEN.is_match(query)
}

/// True when the tool name denotes a mutating operation.
pub fn is_mutating(name: &str) -> bool {
    // Strip the provider namespace; match on the local name only.
    let local = name.rsplit('.').next().unwrap_or(name).to_ascii_lowercase();
    let segments: Vec<&str> = local
        .split(['-', '_'])
        .filter(|s| !s.is_empty())
        .collect();

    MUTATING_TOKENS.iter().any(|token| {
        let token_segments: Vec<&str> = token.split('-').collect();
        segments
            .windows(token_segments.len())
            .any(|window| window == token_segments.as_slice())
    })
}

/// Compute the subset of the catalog that is safe to expose for a turn.
///
/// With a confirmation token present the full catalog passes through
/// unmodified; otherwise every mutating entry is excluded. An empty
/// catalog yields an empty catalog.
pub fn visible_tools(catalog: &ToolCatalog, query: &str) -> ToolCatalog {
    if has_confirmation(query) {
        return catalog.clone();
    }
    catalog.retain_by_name(|name| !is_mutating(name))
}
