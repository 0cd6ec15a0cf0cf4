//! Tool-result collaborators
//!
//! The executor asks a [`ToolResultSource`] for `(subject, tool)` results.
//! A live backend would implement the trait; the demo uses a canned table.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait ToolResultSource: Send + Sync {
    /// Result for `tool_name` against `subject_id`, or `None` when unknown
    async fn lookup(&self, subject_id: &str, tool_name: &str) -> Option<Value>;
}

/// Read-only table of canned results: subject ID -> tool name -> payload
#[derive(Debug, Clone, Default)]
pub struct StaticToolTable {
    entries: HashMap<String, HashMap<String, Value>>,
}

impl StaticToolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, subject_id: &str, tool_name: &str, result: Value) {
        self.entries
            .entry(subject_id.to_string())
            .or_default()
            .insert(tool_name.to_string(), result);
    }

    pub fn with(mut self, subject_id: &str, tool_name: &str, result: Value) -> Self {
        self.insert(subject_id, tool_name, result);
        self
    }

    /// Parse `{ "<subjectId>": { "<toolName>": <result> } }`
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: HashMap<String, HashMap<String, Value>> =
            serde_json::from_str(json).context("tool table must map subject -> tool -> result")?;
        Ok(Self { entries })
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tool table {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ToolResultSource for StaticToolTable {
    async fn lookup(&self, subject_id: &str, tool_name: &str) -> Option<Value> {
        self.entries
            .get(subject_id)
            .and_then(|tools| tools.get(tool_name))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn lookup_is_keyed_by_subject_and_tool() {
        let table = StaticToolTable::new().with(
            "ALRT-001",
            "get_dependency_health",
            json!({"PaymentSvc": "Degraded"}),
        );

        assert_eq!(
            table.lookup("ALRT-001", "get_dependency_health").await,
            Some(json!({"PaymentSvc": "Degraded"}))
        );
        assert_eq!(table.lookup("ALRT-002", "get_dependency_health").await, None);
        assert_eq!(table.lookup("ALRT-001", "search_logs").await, None);
    }

    #[test]
    fn loads_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"ALRT-009": {{"search_logs": {{"matches": 3}}, "query_metrics": [1, 2]}}}}"#
        )
        .unwrap();

        let table = StaticToolTable::from_json_file(file.path()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn rejects_wrong_layout() {
        assert!(StaticToolTable::from_json_str(r#"["not", "a", "map"]"#).is_err());
    }
}
