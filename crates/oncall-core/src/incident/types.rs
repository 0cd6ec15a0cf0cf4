//! Alert and runbook inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertSeverity {
    Critical,
    Warning,
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertSeverity::Critical => write!(f, "CRITICAL"),
            AlertSeverity::Warning => write!(f, "WARNING"),
        }
    }
}

/// Point-in-time gauges attached to an alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub cpu_usage: f64,
    pub db_connections: f64,
    pub redis_latency: f64,
    pub thread_pool_usage: f64,
    pub recent_deploy: String,
    pub error_rate: f64,
    pub memory_usage: f64,
}

/// A firing alert. Read-only to the investigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub service: String,
    pub severity: AlertSeverity,
    pub region: String,
    pub timestamp: DateTime<Utc>,
    pub telemetry: Telemetry,
    pub logs: Vec<String>,
}

impl Alert {
    /// Log lines tagged with stable evidence IDs (`LOG_1`, `LOG_2`, ...)
    pub fn tagged_logs(&self) -> Vec<(String, &str)> {
        self.logs
            .iter()
            .enumerate()
            .map(|(i, line)| (format!("LOG_{}", i + 1), line.as_str()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runbook {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub symptoms: Vec<String>,
    pub checks: Vec<String>,
    pub likely_causes: Vec<String>,
    pub remediation: Vec<String>,
}

impl Runbook {
    /// Identifier shown to the oracle; falls back to `RB_<n>` when unset.
    pub fn display_id(&self, position: usize) -> String {
        if self.id.trim().is_empty() {
            format!("RB_{}", position + 1)
        } else {
            self.id.clone()
        }
    }
}
