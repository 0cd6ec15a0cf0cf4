//! Tool registry and executor
//!
//! The registry is a static catalogue of descriptors handed to the oracle on
//! every exploration turn. The executor resolves a request against a
//! [`ToolResultSource`]; a missing result is a normal outcome encoded in the
//! payload, never an error.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use super::source::ToolResultSource;
use crate::ai::types::{AiTool, AiToolCall};
use crate::incident::ToolCallRecord;

/// Name, description and parameter schema for one tool
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

impl ToolDescriptor {
    pub fn to_ai_tool(&self) -> AiTool {
        AiTool {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.parameters.clone(),
        }
    }
}

/// Payload returned when nothing is known for a `(subject, tool)` pair
pub fn no_data() -> Value {
    json!({ "status": "error", "message": "no data" })
}

fn service_param() -> Value {
    json!({ "type": "STRING", "description": "Service name, e.g. API, PaymentSvc, DB." })
}

/// Fixed catalogue of tools
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::incident_catalogue()
    }
}

impl ToolRegistry {
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self { tools }
    }

    /// Standard on-call investigation tools
    pub fn incident_catalogue() -> Self {
        Self::new(vec![
            ToolDescriptor {
                name: "get_dependency_health",
                description: "Health status of the upstream and downstream dependencies of a service.",
                parameters: json!({
                    "type": "OBJECT",
                    "properties": { "service": service_param() },
                    "required": ["service"]
                }),
            },
            ToolDescriptor {
                name: "get_recent_deploys",
                description: "Recent deployments touching a service and its neighbours.",
                parameters: json!({
                    "type": "OBJECT",
                    "properties": { "service": service_param() },
                    "required": ["service"]
                }),
            },
            ToolDescriptor {
                name: "query_metrics",
                description: "Time series for one metric of a service.",
                parameters: json!({
                    "type": "OBJECT",
                    "properties": {
                        "service": service_param(),
                        "metric": { "type": "STRING", "description": "Metric name, e.g. error_rate, redis_p99_ms." },
                        "window_minutes": { "type": "INTEGER", "description": "Look-back window in minutes." }
                    },
                    "required": ["service", "metric"]
                }),
            },
            ToolDescriptor {
                name: "search_logs",
                description: "Search recent log lines of a service for a pattern.",
                parameters: json!({
                    "type": "OBJECT",
                    "properties": {
                        "service": service_param(),
                        "pattern": { "type": "STRING", "description": "Substring or keyword to search for." }
                    },
                    "required": ["service", "pattern"]
                }),
            },
        ])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.iter().any(|t| t.name == name)
    }

    /// Get all tools as AI tool definitions
    pub fn get_ai_tools(&self) -> Vec<AiTool> {
        self.tools.iter().map(ToolDescriptor::to_ai_tool).collect()
    }
}

/// Resolves tool requests into ledger records
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    source: Arc<dyn ToolResultSource>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, source: Arc<dyn ToolResultSource>) -> Self {
        Self { registry, source }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Resolve `call` for `subject_id` into ledger entry number `sequence`.
    ///
    /// Arguments are recorded as-is and never inspected.
    pub async fn resolve(
        &self,
        subject_id: &str,
        call: &AiToolCall,
        sequence: usize,
    ) -> ToolCallRecord {
        let result = if self.registry.contains(&call.name) {
            self.source.lookup(subject_id, &call.name).await
        } else {
            tracing::debug!(tool = %call.name, "Oracle requested an undeclared tool");
            None
        };

        let result = result.unwrap_or_else(|| {
            tracing::info!(
                subject = subject_id,
                tool = %call.name,
                "No tool data available"
            );
            no_data()
        });

        ToolCallRecord {
            id: format!("TC_{}", sequence),
            tool: call.name.clone(),
            args: call.arguments.clone(),
            result,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::StaticToolTable;

    fn executor() -> ToolExecutor {
        let table = StaticToolTable::new().with(
            "ALRT-001",
            "get_dependency_health",
            json!({"PaymentSvc": "Degraded"}),
        );
        ToolExecutor::new(Arc::new(ToolRegistry::incident_catalogue()), Arc::new(table))
    }

    fn call(name: &str, args: Value) -> AiToolCall {
        AiToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments: args,
            signature: None,
        }
    }

    #[test]
    fn catalogue_declares_every_tool_with_object_schema() {
        let tools = ToolRegistry::incident_catalogue().get_ai_tools();
        assert_eq!(tools.len(), 4);
        assert!(tools.iter().all(|t| t.input_schema["type"] == "OBJECT"));
    }

    #[tokio::test]
    async fn resolves_known_result_and_passes_args_through() {
        let args = json!({"service": "API", "unexpected": [1, 2]});
        let record = executor()
            .resolve("ALRT-001", &call("get_dependency_health", args.clone()), 1)
            .await;

        assert_eq!(record.id, "TC_1");
        assert_eq!(record.tool, "get_dependency_health");
        assert_eq!(record.args, args);
        assert_eq!(record.result, json!({"PaymentSvc": "Degraded"}));
    }

    #[tokio::test]
    async fn missing_mapping_is_no_data() {
        let record = executor()
            .resolve("ALRT-001", &call("search_logs", json!({})), 2)
            .await;
        assert_eq!(record.result, no_data());
    }

    #[tokio::test]
    async fn undeclared_tool_is_no_data() {
        let record = executor()
            .resolve("ALRT-001", &call("restart_cluster", json!({})), 3)
            .await;
        assert_eq!(record.tool, "restart_cluster");
        assert_eq!(record.result["message"], "no data");
    }
}
