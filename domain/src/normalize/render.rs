//! Rendering of normalized results into user-facing text.

use crate::normalize::payload::{NormalizedResult, LOG_DISPLAY_LIMIT};

/// Display cap for documents in a rendered reply.
pub const DOCUMENT_DISPLAY_LIMIT: usize = 10;

/// Format a byte count with two decimals at fixed binary boundaries.
///
/// ```
/// use mongochat_domain::human_bytes;
///
/// assert_eq!(human_bytes(0), "0.00 bytes");
/// assert_eq!(human_bytes(1024), "1.00 KB");
/// assert_eq!(human_bytes(1536), "1.50 KB");
/// ```
pub fn human_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    const TB: f64 = GB * 1024.0;

    let value = bytes as f64;
    if value >= TB {
        format!("{:.2} TB", value / TB)
    } else if value >= GB {
        format!("{:.2} GB", value / GB)
    } else if value >= MB {
        format!("{:.2} MB", value / MB)
    } else if value >= KB {
        format!("{:.2} KB", value / KB)
    } else {
        format!("{value:.2} bytes")
    }
}

/// Render one normalized result as markdown, either tabular or prose.
pub fn render(result: &NormalizedResult, as_table: bool) -> String {
    match result {
        NormalizedResult::Databases(entries) => {
            if entries.is_empty() {
                return "No databases found.".to_string();
            }
            if as_table {
                let mut out = String::from("| Database | Size |\n|---|---|\n");
                for entry in entries {
                    let size = entry
                        .size_bytes
                        .map(human_bytes)
                        .unwrap_or_else(|| "unknown".to_string());
                    out.push_str(&format!("| {} | {} |\n", entry.name, size));
                }
                out
            } else {
                let lines: Vec<String> = entries
                    .iter()
                    .map(|entry| match entry.size_bytes {
                        Some(size) => format!("- {} ({})", entry.name, human_bytes(size)),
                        None => format!("- {}", entry.name),
                    })
                    .collect();
                format!("Databases:\n{}", lines.join("\n"))
            }
        }
        NormalizedResult::Collections(names) => {
            if names.is_empty() {
                return "No collections found.".to_string();
            }
            if as_table {
                let mut out = String::from("| Collection |\n|---|\n");
                for name in names {
                    out.push_str(&format!("| {name} |\n"));
                }
                out
            } else {
                let lines: Vec<String> = names.iter().map(|n| format!("- {n}")).collect();
                format!("Collections:\n{}", lines.join("\n"))
            }
        }
        NormalizedResult::Indexes(entries) => {
            if entries.is_empty() {
                return "No indexes found.".to_string();
            }
            if as_table {
                let mut out = String::from("| Index | Key | Flags |\n|---|---|---|\n");
                for entry in entries {
                    out.push_str(&format!(
                        "| {} | `{}` | {} |\n",
                        entry.name,
                        entry.key,
                        index_flags(entry.unique, entry.sparse, entry.ttl_seconds)
                    ));
                }
                out
            } else {
                let lines: Vec<String> = entries
                    .iter()
                    .map(|entry| {
                        let flags = index_flags(entry.unique, entry.sparse, entry.ttl_seconds);
                        if flags.is_empty() {
                            format!("- {} on `{}`", entry.name, entry.key)
                        } else {
                            format!("- {} on `{}` ({flags})", entry.name, entry.key)
                        }
                    })
                    .collect();
                format!("Indexes:\n{}", lines.join("\n"))
            }
        }
        NormalizedResult::Acknowledgement(ack) => {
            let verdict = if ack.ok { "succeeded" } else { "failed" };
            match &ack.name {
                Some(name) => format!("Operation on `{name}` {verdict}."),
                None => format!("Operation {verdict}."),
            }
        }
        NormalizedResult::Documents(docs) => {
            let shown = docs.len().min(DOCUMENT_DISPLAY_LIMIT);
            let mut out = if docs.len() > shown {
                format!("Showing up to {shown} of {} documents:\n", docs.len())
            } else {
                format!("Found {} document(s):\n", docs.len())
            };
            for doc in docs.iter().take(shown) {
                let pretty = serde_json::to_string_pretty(doc).unwrap_or_else(|_| doc.to_string());
                out.push_str(&format!("```json\n{pretty}\n```\n"));
            }
            out
        }
        NormalizedResult::Count(count) => format!("Count: {count}"),
        NormalizedResult::StorageSize(Some(size)) => {
            format!("Storage size: {} ({size} bytes)", human_bytes(*size))
        }
        NormalizedResult::StorageSize(None) => "Storage size unavailable.".to_string(),
        NormalizedResult::Stats(stats) => {
            let pretty =
                serde_json::to_string_pretty(stats).unwrap_or_else(|_| stats.to_string());
            format!("Statistics:\n```json\n{pretty}\n```")
        }
        NormalizedResult::Explain(summary) => summary.clone(),
        NormalizedResult::Logs(lines) => {
            let mut out = if lines.len() >= LOG_DISPLAY_LIMIT {
                format!("Latest {} log lines:\n", lines.len())
            } else {
                format!("{} log line(s):\n", lines.len())
            };
            out.push_str("```\n");
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push_str("```");
            out
        }
        NormalizedResult::Opaque(text) => text.clone(),
    }
}

fn index_flags(unique: bool, sparse: bool, ttl_seconds: Option<i64>) -> String {
    let mut flags = Vec::new();
    if unique {
        flags.push("unique".to_string());
    }
    if sparse {
        flags.push("sparse".to_string());
    }
    if let Some(ttl) = ttl_seconds {
        flags.push(format!("ttl {ttl}s"));
    }
    flags.join(", ")
}
