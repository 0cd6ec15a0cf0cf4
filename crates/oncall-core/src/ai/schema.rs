//! Response schema for the incident report
//!
//! Declared on synthesis and refinement calls. Field names match
//! [`CopilotState`](crate::incident::CopilotState)'s serde names; the ledger
//! and completion flag are attached by the loop, not requested.

use serde_json::{json, Value};

fn string_list(description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" },
        "description": description,
    })
}

fn step_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING", "description": "Unique step ID like S1, S2, S3." },
            "action": { "type": "STRING", "description": "What to do, grounded in runbook instructions where possible." },
            "reason": { "type": "STRING", "description": "Why this step matters, grounded in logs, telemetry and tool results." },
            "expectation": { "type": "STRING", "description": "What you expect to observe if the hypothesis is correct." },
            "stopCondition": { "type": "STRING", "description": "When to stop, pivot or escalate." },
            "citesLogs": string_list("LOG_* IDs supporting this step."),
            "citesRunbooks": string_list("Runbook IDs supporting this step."),
            "citesToolCalls": string_list("TC_* IDs of tool results supporting this step."),
            "ifPassNext": { "type": "STRING", "description": "Step ID if the expectation is met, or END." },
            "ifFailNext": { "type": "STRING", "description": "Step ID if the expectation is NOT met, or END." }
        },
        "required": [
            "id", "action", "reason", "expectation",
            "citesLogs", "citesRunbooks", "ifPassNext", "ifFailNext"
        ]
    })
}

/// Schema the oracle must fill for a final or refined report
pub fn report_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "Clear summary of the alert's impact, grounded in LOG_* and TC_* evidence IDs."
            },
            "hypothesis": {
                "type": "STRING",
                "description": "Most likely cause. Must reference runbook IDs and evidence IDs that support it."
            },
            "alternativeHypothesis": {
                "type": "STRING",
                "description": "Next most likely cause, if any."
            },
            "confidence": {
                "type": "NUMBER",
                "description": "0.0 to 1.0 confidence in the current hypothesis."
            },
            "evidenceLogs": string_list("LOG_* IDs that directly support summary and hypothesis."),
            "evidenceRunbooks": string_list("Runbook IDs that support the plan."),
            "steps": {
                "type": "ARRAY",
                "description": "Investigation steps as a decision tree with pass/fail branching.",
                "items": step_schema()
            },
            "communicationDraft": {
                "type": "STRING",
                "description": "Short status update suitable for an incident channel."
            },
            "questionsToAsk": string_list("High-signal questions to ask the engineer."),
            "missingSignals": string_list("Telemetry or logs you wish you had next."),
            "estimatedTimeSavedMinutes": {
                "type": "NUMBER",
                "description": "Estimated minutes saved vs manual triage."
            }
        },
        "required": [
            "summary", "hypothesis", "confidence", "evidenceLogs", "evidenceRunbooks",
            "steps", "questionsToAsk", "missingSignals", "estimatedTimeSavedMinutes"
        ]
    })
}
