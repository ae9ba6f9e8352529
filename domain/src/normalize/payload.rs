//! Payload decoding into canonical values.
//!
//! Every decoder tolerates three payload shapes: a structured object
//! with the expected field names, a bare array, and a generic
//! `{content:[{type,text}]}` fragment list whose text is recovered by
//! pattern matching or a nested JSON parse. Unrecognized shapes degrade
//! to [`NormalizedResult::Opaque`]; decoding never fails.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::normalize::category::ToolCategory;

/// Display cap for log lines.
pub const LOG_DISPLAY_LIMIT: usize = 20;

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"Name:\s*"?([^",\n]+)"?"#).expect("valid name pattern"));
static SIZE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Size:\s*(\d+)\s*bytes").expect("valid size pattern"));
static BYTES_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*bytes").expect("valid bytes pattern"));

/// A named entity with an optional byte size (one database).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseEntry {
    pub name: String,
    pub size_bytes: Option<u64>,
}

/// One index descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub name: String,
    pub key: Value,
    pub unique: bool,
    pub sparse: bool,
    pub ttl_seconds: Option<i64>,
}

/// Acknowledgement of a write or index-creation operation.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteAck {
    pub ok: bool,
    pub name: Option<String>,
    pub details: Option<Value>,
}

/// Canonical decoded form of one tool-result payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResult {
    Databases(Vec<DatabaseEntry>),
    Collections(Vec<String>),
    Indexes(Vec<IndexEntry>),
    Acknowledgement(WriteAck),
    Documents(Vec<Value>),
    Count(u64),
    StorageSize(Option<u64>),
    Stats(Value),
    Explain(String),
    Logs(Vec<String>),
    /// Literal textual echo of an unrecognized payload.
    Opaque(String),
}

/// Decode a raw payload according to its category.
pub fn normalize_payload(category: ToolCategory, payload: &Value) -> NormalizedResult {
    match category {
        ToolCategory::Databases => parse_databases(payload),
        ToolCategory::Collections => parse_collections(payload),
        ToolCategory::Indexes => parse_indexes(payload),
        ToolCategory::Acknowledgement => parse_acknowledgement(payload),
        ToolCategory::Documents => parse_documents(payload),
        ToolCategory::Count => parse_count(payload),
        ToolCategory::StorageSize => parse_storage_size(payload),
        ToolCategory::Stats => parse_stats(payload),
        ToolCategory::Explain => parse_explain(payload),
        ToolCategory::Logs => parse_logs(payload),
        ToolCategory::Unknown => NormalizedResult::Opaque(opaque_echo(payload)),
    }
}

/// Extract the text of every `{type, text}` fragment in a generic
/// `content` array. The `type` value is not inspected: providers have
/// shipped variants like `"text neighbor"`, and the text is what matters.
pub fn text_fragments(payload: &Value) -> Vec<String> {
    payload
        .get("content")
        .and_then(|c| c.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("text").and_then(|t| t.as_str()))
                .map(|t| t.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Literal textual echo of a payload for the opaque fallback.
pub fn opaque_echo(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        other => {
            let fragments = text_fragments(other);
            if fragments.is_empty() {
                other.to_string()
            } else {
                fragments.join("\n")
            }
        }
    }
}

/// Extract document-like records from any supported payload shape.
///
/// Used both by the `Documents` decoder and by the degenerate-output
/// guard's deterministic fallback, which needs to detect "we did fetch
/// documents" regardless of category.
pub fn extract_documents(payload: &Value) -> Vec<Value> {
    if let Some(docs) = payload.get("documents").and_then(|d| d.as_array()) {
        return docs.clone();
    }
    if let Some(items) = payload.as_array() {
        return items.iter().filter(|v| v.is_object()).cloned().collect();
    }
    text_fragments(payload)
        .iter()
        .filter_map(|text| serde_json::from_str::<Value>(text).ok())
        .flat_map(|value| match value {
            Value::Array(items) => items,
            Value::Object(_) => vec![value],
            _ => Vec::new(),
        })
        .filter(|v| v.is_object())
        .collect()
}

/// True when a record carries an identifier field.
pub fn has_identifier(doc: &Value) -> bool {
    doc.get("_id").is_some() || doc.get("id").is_some()
}

fn parse_databases(payload: &Value) -> NormalizedResult {
    if let Some(list) = payload.get("databases").and_then(|d| d.as_array()) {
        return NormalizedResult::Databases(list.iter().filter_map(database_entry).collect());
    }
    if let Some(items) = payload.as_array() {
        return NormalizedResult::Databases(items.iter().filter_map(database_entry).collect());
    }

    let fragments = text_fragments(payload);
    if !fragments.is_empty() {
        let entries: Vec<DatabaseEntry> = fragments
            .iter()
            .filter_map(|text| {
                if let Ok(nested) = serde_json::from_str::<Value>(text) {
                    return database_entry(&nested);
                }
                let name = NAME_PATTERN.captures(text)?.get(1)?.as_str().trim().to_string();
                let size_bytes = SIZE_PATTERN
                    .captures(text)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse().ok());
                Some(DatabaseEntry { name, size_bytes })
            })
            .collect();
        if !entries.is_empty() {
            return NormalizedResult::Databases(entries);
        }
    }

    NormalizedResult::Opaque(opaque_echo(payload))
}

fn database_entry(value: &Value) -> Option<DatabaseEntry> {
    match value {
        Value::String(name) => Some(DatabaseEntry {
            name: name.clone(),
            size_bytes: None,
        }),
        Value::Object(map) => {
            let name = map.get("name")?.as_str()?.to_string();
            let size_bytes = ["sizeOnDisk", "sizeBytes", "size"]
                .iter()
                .find_map(|key| map.get(*key))
                .and_then(Value::as_u64);
            Some(DatabaseEntry { name, size_bytes })
        }
        _ => None,
    }
}

fn parse_collections(payload: &Value) -> NormalizedResult {
    if let Some(list) = payload.get("collections").and_then(|c| c.as_array()) {
        return NormalizedResult::Collections(list.iter().filter_map(collection_name).collect());
    }
    if let Some(items) = payload.as_array() {
        return NormalizedResult::Collections(items.iter().filter_map(collection_name).collect());
    }

    let fragments = text_fragments(payload);
    if !fragments.is_empty() {
        let names: Vec<String> = fragments
            .iter()
            .filter_map(|text| {
                if let Ok(nested) = serde_json::from_str::<Value>(text) {
                    return collection_name(&nested);
                }
                NAME_PATTERN
                    .captures(text)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().trim().to_string())
            })
            .collect();
        if !names.is_empty() {
            return NormalizedResult::Collections(names);
        }
    }

    NormalizedResult::Opaque(opaque_echo(payload))
}

fn collection_name(value: &Value) -> Option<String> {
    match value {
        Value::String(name) => Some(name.clone()),
        Value::Object(map) => map.get("name").and_then(|n| n.as_str()).map(String::from),
        _ => None,
    }
}

fn parse_indexes(payload: &Value) -> NormalizedResult {
    if let Some(list) = payload.get("indexes").and_then(|i| i.as_array()) {
        return NormalizedResult::Indexes(list.iter().filter_map(index_entry).collect());
    }
    if let Some(items) = payload.as_array() {
        return NormalizedResult::Indexes(items.iter().filter_map(index_entry).collect());
    }

    let nested: Vec<IndexEntry> = text_fragments(payload)
        .iter()
        .filter_map(|text| serde_json::from_str::<Value>(text).ok())
        .flat_map(|value| match value {
            Value::Array(items) => items,
            other => vec![other],
        })
        .filter_map(|v| index_entry(&v))
        .collect();
    if !nested.is_empty() {
        return NormalizedResult::Indexes(nested);
    }

    NormalizedResult::Opaque(opaque_echo(payload))
}

fn index_entry(value: &Value) -> Option<IndexEntry> {
    let map = value.as_object()?;
    let name = map.get("name")?.as_str()?.to_string();
    Some(IndexEntry {
        name,
        key: map.get("key").cloned().unwrap_or(Value::Null),
        unique: map.get("unique").and_then(Value::as_bool).unwrap_or(false),
        sparse: map.get("sparse").and_then(Value::as_bool).unwrap_or(false),
        ttl_seconds: map
            .get("expireAfterSeconds")
            .or_else(|| map.get("ttlSeconds"))
            .and_then(Value::as_i64),
    })
}

fn parse_acknowledgement(payload: &Value) -> NormalizedResult {
    if let Some(map) = payload.as_object() {
        if !map.contains_key("content") {
            let ok = map
                .get("ok")
                .map(truthy)
                .or_else(|| map.get("acknowledged").map(truthy))
                .unwrap_or(true);
            let name = ["name", "indexName", "collection"]
                .iter()
                .find_map(|key| map.get(*key))
                .and_then(|v| v.as_str())
                .map(String::from);
            return NormalizedResult::Acknowledgement(WriteAck {
                ok,
                name,
                details: Some(payload.clone()),
            });
        }
    }

    for text in text_fragments(payload) {
        if let Ok(nested) = serde_json::from_str::<Value>(&text) {
            if nested.is_object() {
                return parse_acknowledgement(&nested);
            }
        }
    }

    let echo = opaque_echo(payload);
    if echo.is_empty() {
        NormalizedResult::Opaque(echo)
    } else {
        // A bare confirmation sentence still acknowledges the write.
        NormalizedResult::Acknowledgement(WriteAck {
            ok: true,
            name: None,
            details: Some(Value::String(echo)),
        })
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => s.eq_ignore_ascii_case("true") || s == "1",
        _ => false,
    }
}

fn parse_documents(payload: &Value) -> NormalizedResult {
    let docs = extract_documents(payload);
    if !docs.is_empty() {
        return NormalizedResult::Documents(docs);
    }
    NormalizedResult::Opaque(opaque_echo(payload))
}

fn parse_count(payload: &Value) -> NormalizedResult {
    if let Some(count) = payload.get("count").and_then(Value::as_u64) {
        return NormalizedResult::Count(count);
    }
    if let Some(count) = payload.as_u64() {
        return NormalizedResult::Count(count);
    }
    for text in text_fragments(payload) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&text) {
            if let Some(count) = map.get("count").and_then(Value::as_u64) {
                return NormalizedResult::Count(count);
            }
        }
        if let Ok(count) = text.trim().parse::<u64>() {
            return NormalizedResult::Count(count);
        }
    }
    NormalizedResult::Opaque(opaque_echo(payload))
}

fn parse_storage_size(payload: &Value) -> NormalizedResult {
    if let Some(map) = payload.as_object() {
        let size = ["size", "sizeBytes", "totalSize", "storageSize"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(Value::as_u64);
        if size.is_some() {
            return NormalizedResult::StorageSize(size);
        }
    }
    if let Some(size) = payload.as_u64() {
        return NormalizedResult::StorageSize(Some(size));
    }
    for text in text_fragments(payload) {
        if let Some(captures) = BYTES_PATTERN.captures(&text) {
            let size = captures.get(1).and_then(|m| m.as_str().parse().ok());
            return NormalizedResult::StorageSize(size);
        }
        if let Ok(size) = text.trim().parse::<u64>() {
            return NormalizedResult::StorageSize(Some(size));
        }
    }
    NormalizedResult::StorageSize(None)
}

fn parse_stats(payload: &Value) -> NormalizedResult {
    if payload.is_object() && payload.get("content").is_none() {
        return NormalizedResult::Stats(payload.clone());
    }
    for text in text_fragments(payload) {
        if let Ok(nested) = serde_json::from_str::<Value>(&text) {
            if nested.is_object() {
                return NormalizedResult::Stats(nested);
            }
        }
    }
    NormalizedResult::Opaque(opaque_echo(payload))
}

fn parse_explain(payload: &Value) -> NormalizedResult {
    let plan = if payload.get("content").is_some() {
        text_fragments(payload)
            .iter()
            .find_map(|text| serde_json::from_str::<Value>(text).ok())
    } else {
        Some(payload.clone())
    };

    match plan {
        Some(value) => match find_winning_plan(&value) {
            Some(winning) => NormalizedResult::Explain(summarize_plan_stages(winning)),
            None => NormalizedResult::Explain(value.to_string()),
        },
        None => NormalizedResult::Opaque(opaque_echo(payload)),
    }
}

/// Depth-first search for a nested `winningPlan` field.
fn find_winning_plan(value: &Value) -> Option<&Value> {
    let map = value.as_object()?;
    if let Some(plan) = map.get("winningPlan") {
        return Some(plan);
    }
    map.values().find_map(find_winning_plan)
}

/// Flatten a winning plan's stage chain into `STAGE <- STAGE <- ...`.
fn summarize_plan_stages(plan: &Value) -> String {
    let mut stages = Vec::new();
    let mut current = Some(plan);
    while let Some(node) = current {
        if let Some(stage) = node.get("stage").and_then(|s| s.as_str()) {
            stages.push(stage.to_string());
        }
        current = node.get("inputStage");
    }
    if stages.is_empty() {
        plan.to_string()
    } else {
        format!("winning plan: {}", stages.join(" <- "))
    }
}

fn parse_logs(payload: &Value) -> NormalizedResult {
    let lines: Vec<String> = if let Some(list) = payload.get("logs").and_then(|l| l.as_array()) {
        list.iter().map(log_line).collect()
    } else if let Some(items) = payload.as_array() {
        items.iter().map(log_line).collect()
    } else {
        text_fragments(payload)
            .iter()
            .flat_map(|text| text.lines().map(str::to_string).collect::<Vec<_>>())
            .collect()
    };

    if lines.is_empty() {
        return NormalizedResult::Opaque(opaque_echo(payload));
    }
    NormalizedResult::Logs(lines.into_iter().take(LOG_DISPLAY_LIMIT).collect())
}

fn log_line(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn databases_from_structured_object() {
        let payload = json!({"databases": [
            {"name": "admin", "sizeOnDisk": 102400},
            {"name": "app", "sizeOnDisk": 2048000},
        ]});
        let NormalizedResult::Databases(entries) =
            normalize_payload(ToolCategory::Databases, &payload)
        else {
            panic!("expected databases");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "admin");
        assert_eq!(entries[0].size_bytes, Some(102400));
    }

    #[test]
    fn databases_from_content_fragments() {
        let payload = json!({"content": [
            {"type": "text", "text": "Name: \"admin\", Size: 102400 bytes"},
            {"type": "text", "text": "Name: \"app\", Size: 2048000 bytes"},
        ]});
        let NormalizedResult::Databases(entries) =
            normalize_payload(ToolCategory::Databases, &payload)
        else {
            panic!("expected databases");
        };
        assert_eq!(entries[1].name, "app");
        assert_eq!(entries[1].size_bytes, Some(2048000));
    }

    #[test]
    fn collections_from_fragments_with_odd_types() {
        // The fragment type is not inspected; only the text matters.
        let payload = json!({"content": [
            {"type": "text neighbor", "text": "Name: \"orders\""},
            {"type": "text", "text": "Name: \"users\""},
        ]});
        let NormalizedResult::Collections(names) =
            normalize_payload(ToolCategory::Collections, &payload)
        else {
            panic!("expected collections");
        };
        assert_eq!(names, vec!["orders", "users"]);
    }

    #[test]
    fn collections_from_bare_array() {
        let payload = json!(["orders", "users"]);
        let NormalizedResult::Collections(names) =
            normalize_payload(ToolCategory::Collections, &payload)
        else {
            panic!("expected collections");
        };
        assert_eq!(names, vec!["orders", "users"]);
    }

    #[test]
    fn indexes_with_flags_and_ttl() {
        let payload = json!({"indexes": [
            {"name": "_id_", "key": {"_id": 1}},
            {"name": "ttl_idx", "key": {"createdAt": 1}, "expireAfterSeconds": 3600, "sparse": true},
        ]});
        let NormalizedResult::Indexes(entries) = normalize_payload(ToolCategory::Indexes, &payload)
        else {
            panic!("expected indexes");
        };
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].unique);
        assert_eq!(entries[1].ttl_seconds, Some(3600));
        assert!(entries[1].sparse);
    }

    #[test]
    fn acknowledgement_variants() {
        let NormalizedResult::Acknowledgement(ack) = normalize_payload(
            ToolCategory::Acknowledgement,
            &json!({"acknowledged": true, "indexName": "email_1"}),
        ) else {
            panic!("expected ack");
        };
        assert!(ack.ok);
        assert_eq!(ack.name.as_deref(), Some("email_1"));

        // Numeric ok (mongo's `{ok: 1}`)
        let NormalizedResult::Acknowledgement(ack) =
            normalize_payload(ToolCategory::Acknowledgement, &json!({"ok": 1}))
        else {
            panic!("expected ack");
        };
        assert!(ack.ok);
    }

    #[test]
    fn documents_from_nested_fragment_json() {
        let payload = json!({"content": [
            {"type": "text", "text": "[{\"_id\": 1, \"name\": \"a\"}, {\"_id\": 2, \"name\": \"b\"}]"},
        ]});
        let NormalizedResult::Documents(docs) =
            normalize_payload(ToolCategory::Documents, &payload)
        else {
            panic!("expected documents");
        };
        assert_eq!(docs.len(), 2);
        assert!(has_identifier(&docs[0]));
    }

    #[test]
    fn count_from_scalar_and_fragment() {
        assert_eq!(
            normalize_payload(ToolCategory::Count, &json!(42)),
            NormalizedResult::Count(42)
        );
        assert_eq!(
            normalize_payload(ToolCategory::Count, &json!({"count": 7})),
            NormalizedResult::Count(7)
        );
        assert_eq!(
            normalize_payload(
                ToolCategory::Count,
                &json!({"content": [{"type": "text", "text": "13"}]})
            ),
            NormalizedResult::Count(13)
        );
    }

    #[test]
    fn storage_size_from_fragment_text() {
        let payload = json!({"content": [{"type": "text", "text": "Size: 1048576 bytes"}]});
        assert_eq!(
            normalize_payload(ToolCategory::StorageSize, &payload),
            NormalizedResult::StorageSize(Some(1048576))
        );
    }

    #[test]
    fn explain_summarizes_winning_plan() {
        let payload = json!({"queryPlanner": {"winningPlan": {
            "stage": "FETCH",
            "inputStage": {"stage": "IXSCAN"}
        }}});
        let NormalizedResult::Explain(summary) = normalize_payload(ToolCategory::Explain, &payload)
        else {
            panic!("expected explain");
        };
        assert_eq!(summary, "winning plan: FETCH <- IXSCAN");
    }

    #[test]
    fn explain_without_winning_plan_echoes_json() {
        let payload = json!({"plannerVersion": 1});
        let NormalizedResult::Explain(summary) = normalize_payload(ToolCategory::Explain, &payload)
        else {
            panic!("expected explain");
        };
        assert!(summary.contains("plannerVersion"));
    }

    #[test]
    fn logs_are_capped() {
        let lines: Vec<Value> = (0..50).map(|i| json!(format!("line {i}"))).collect();
        let NormalizedResult::Logs(logs) =
            normalize_payload(ToolCategory::Logs, &json!({"logs": lines}))
        else {
            panic!("expected logs");
        };
        assert_eq!(logs.len(), LOG_DISPLAY_LIMIT);
        assert_eq!(logs[0], "line 0");
    }

    #[test]
    fn unknown_shapes_degrade_to_opaque_echo() {
        let payload = json!({"surprise": true});
        match normalize_payload(ToolCategory::Databases, &payload) {
            NormalizedResult::Opaque(echo) => assert!(echo.contains("surprise")),
            other => panic!("expected opaque, got {other:?}"),
        }
    }

    #[test]
    fn opaque_echo_prefers_fragment_text() {
        let payload = json!({"content": [{"type": "text", "text": "free form answer"}]});
        assert_eq!(opaque_echo(&payload), "free form answer");
    }
}
