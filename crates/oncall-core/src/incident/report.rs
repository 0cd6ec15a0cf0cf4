//! Investigation report state
//!
//! `CopilotState` is published as a full snapshot on every emission. The same
//! type is what the oracle is asked to produce during synthesis, so optional
//! fields default when the oracle leaves them out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One resolved tool interaction in the evidence ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Sequence identifier (`TC_1`, `TC_2`, ...)
    pub id: String,
    pub tool: String,
    pub args: Value,
    pub result: Value,
    pub timestamp: DateTime<Utc>,
}

/// A single investigation action in the decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub action: String,
    pub reason: String,
    pub expectation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_condition: Option<String>,
    #[serde(default)]
    pub cites_logs: Vec<String>,
    #[serde(default)]
    pub cites_runbooks: Vec<String>,
    #[serde(default)]
    pub cites_tool_calls: Vec<String>,
    /// Step ID to follow when the expectation holds, or `END`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_pass_next: Option<String>,
    /// Step ID to follow when the expectation does not hold, or `END`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_fail_next: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopilotState {
    pub summary: String,
    pub hypothesis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_hypothesis: Option<String>,
    /// Raw confidence. Use [`CopilotState::confidence_percent`] for display.
    pub confidence: f64,
    #[serde(default)]
    pub evidence_logs: Vec<String>,
    #[serde(default)]
    pub evidence_runbooks: Vec<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_draft: Option<String>,
    #[serde(default)]
    pub questions_to_ask: Vec<String>,
    #[serde(default)]
    pub missing_signals: Vec<String>,
    #[serde(default)]
    pub estimated_time_saved_minutes: f64,
    #[serde(default)]
    pub is_investigation_complete: bool,
}

impl CopilotState {
    /// Confidence as a whole percentage, whatever scale the producer used.
    pub fn confidence_percent(&self) -> u8 {
        confidence_percent(self.confidence)
    }

    /// Rewrite `confidence` into [0, 1].
    pub fn repair_confidence(&mut self) {
        self.confidence = normalize_confidence(self.confidence);
    }
}

/// Normalize a confidence value to a fraction in [0, 1].
///
/// Values above 1 are taken as already-percent and divided by 100. Non-finite
/// input maps to 0.
pub fn normalize_confidence(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    let fraction = if raw > 1.0 { raw / 100.0 } else { raw };
    fraction.clamp(0.0, 1.0)
}

/// Rounded display percentage for a raw confidence value.
pub fn confidence_percent(raw: f64) -> u8 {
    (normalize_confidence(raw) * 100.0).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One turn of the follow-up conversation with the engineer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<CopilotState>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: ChatRole::User,
            content: content.into(),
            state: None,
        }
    }

    pub fn assistant(content: impl Into<String>, state: Option<CopilotState>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role: ChatRole::Assistant,
            content: content.into(),
            state,
        }
    }
}
