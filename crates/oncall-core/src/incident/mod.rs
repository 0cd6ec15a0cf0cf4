//! Incident domain types
//!
//! Alerts and runbooks are immutable inputs; `CopilotState` is the snapshot
//! the investigation loop publishes.

pub mod demo;
pub mod report;
pub mod types;

pub use report::{
    confidence_percent, normalize_confidence, ChatRole, CopilotState, Message, Step,
    ToolCallRecord,
};
pub use types::{Alert, AlertSeverity, Runbook, Telemetry};
