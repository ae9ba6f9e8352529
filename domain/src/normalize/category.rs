//! Tool-result categories and the name→category table.
//!
//! Each tool result is classified exactly once, by registered name
//! pattern, and then dispatched to the matching decoder, with no cascading
//! substring tests at decode time.

/// Category of a tool result, driving decoder dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolCategory {
    /// Named entities with optional byte sizes (databases).
    Databases,
    /// Plain collection names.
    Collections,
    /// Index descriptors with uniqueness/sparsity/TTL flags.
    Indexes,
    /// Write or create-index acknowledgement.
    Acknowledgement,
    /// Generic document arrays.
    Documents,
    /// Scalar count.
    Count,
    /// Storage-size scalar.
    StorageSize,
    /// Aggregate statistics object, passed through.
    Stats,
    /// Query-plan explanation.
    Explain,
    /// Log lines.
    Logs,
    /// No registered category for the tool name.
    Unknown,
}

/// Registered name→category table.
///
/// Patterns are matched as suffixes of the lowercased, unnamespaced
/// tool name, longest pattern first, so `collection-storage-size` wins
/// over `collection` and `mongodb.find` resolves via its local name.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    entries: Vec<(String, ToolCategory)>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        let mut table = Self {
            entries: Vec::new(),
        };
        table
            .register("list-databases", ToolCategory::Databases)
            .register("list-collections", ToolCategory::Collections)
            .register("collection-indexes", ToolCategory::Indexes)
            .register("list-indexes", ToolCategory::Indexes)
            .register("insert-many", ToolCategory::Acknowledgement)
            .register("insert-one", ToolCategory::Acknowledgement)
            .register("update-many", ToolCategory::Acknowledgement)
            .register("update-one", ToolCategory::Acknowledgement)
            .register("delete-many", ToolCategory::Acknowledgement)
            .register("delete-one", ToolCategory::Acknowledgement)
            .register("create-index", ToolCategory::Acknowledgement)
            .register("create-collection", ToolCategory::Acknowledgement)
            .register("find", ToolCategory::Documents)
            .register("aggregate", ToolCategory::Documents)
            .register("count", ToolCategory::Count)
            .register("collection-storage-size", ToolCategory::StorageSize)
            .register("storage-size", ToolCategory::StorageSize)
            .register("db-stats", ToolCategory::Stats)
            .register("collection-schema", ToolCategory::Stats)
            .register("explain", ToolCategory::Explain)
            .register("logs", ToolCategory::Logs);
        table
    }
}

impl CategoryTable {
    pub fn register(
        &mut self,
        pattern: impl Into<String>,
        category: ToolCategory,
    ) -> &mut Self {
        let pattern = pattern.into().to_ascii_lowercase();
        self.entries.push((pattern, category));
        // Longest pattern first keeps the most specific registration
        // winning regardless of registration order.
        self.entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self
    }

    /// Classify a tool name. Unregistered names map to `Unknown`.
    pub fn classify(&self, tool_name: &str) -> ToolCategory {
        let local = tool_name
            .rsplit('.')
            .next()
            .unwrap_or(tool_name)
            .to_ascii_lowercase();

        self.entries
            .iter()
            .find(|(pattern, _)| local.ends_with(pattern.as_str()))
            .map(|(_, category)| *category)
            .unwrap_or(ToolCategory::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_namespaced_names() {
        let table = CategoryTable::default();
        assert_eq!(
            table.classify("mongodb.list-databases"),
            ToolCategory::Databases
        );
        assert_eq!(table.classify("mongodb.find"), ToolCategory::Documents);
        assert_eq!(table.classify("mongodb.count"), ToolCategory::Count);
        assert_eq!(table.classify("mongodb.mongodb-logs"), ToolCategory::Logs);
    }

    #[test]
    fn longest_pattern_wins() {
        let table = CategoryTable::default();
        // "collection-storage-size" also ends with neither "count" nor
        // "find" but must not be swallowed by a shorter registration.
        assert_eq!(
            table.classify("mongodb.collection-storage-size"),
            ToolCategory::StorageSize
        );
        assert_eq!(
            table.classify("mongodb.collection-indexes"),
            ToolCategory::Indexes
        );
    }

    #[test]
    fn unknown_names_fall_through() {
        let table = CategoryTable::default();
        assert_eq!(table.classify("mongodb.switch-connection"), ToolCategory::Unknown);
    }

    #[test]
    fn custom_registration() {
        let mut table = CategoryTable::default();
        table.register("server-status", ToolCategory::Stats);
        assert_eq!(table.classify("mongodb.server-status"), ToolCategory::Stats);
    }
}
