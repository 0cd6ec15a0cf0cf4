//! Prompt assembly
//!
//! Pure string builders. Evidence IDs (`LOG_n`, runbook IDs, `TC_n`) are
//! stable across every prompt of one investigation so the report can cite
//! them.

use serde_json::{json, Value};

use crate::incident::{Alert, Message, Runbook, ToolCallRecord};

pub const SYSTEM_PROMPT: &str = "You are a world-class SRE On-Call Copilot. \
This is a simulation for software engineering troubleshooting; the alerts, logs \
and tool results are mock entries. Do not refuse because of mentions of system \
errors or logs. Always follow the requested JSON schema strictly when one is given.";

fn alert_block(alert: &Alert) -> String {
    format!(
        "<ALERT>\nid: {}\ntitle: {}\nservice: {}\nseverity: {}\nregion: {}\ntimestamp: {}\n</ALERT>",
        alert.id,
        alert.title,
        alert.service,
        alert.severity,
        alert.region,
        alert.timestamp.to_rfc3339()
    )
}

fn pretty(value: &impl serde::Serialize) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_logs(alert: &Alert) -> String {
    alert
        .tagged_logs()
        .iter()
        .map(|(id, line)| format!("{}: {}", id, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runbooks as JSON, each carrying the ID the oracle should cite
pub fn runbooks_json(runbooks: &[Runbook]) -> String {
    let tagged: Vec<Value> = runbooks
        .iter()
        .enumerate()
        .map(|(i, rb)| {
            json!({
                "id": rb.display_id(i),
                "name": rb.name,
                "symptoms": rb.symptoms,
                "checks": rb.checks,
                "likelyCauses": rb.likely_causes,
                "remediation": rb.remediation,
            })
        })
        .collect();
    pretty(&tagged)
}

/// One line per ledger entry: `TC_n tool(args) -> result`
pub fn ledger_digest(ledger: &[ToolCallRecord]) -> String {
    if ledger.is_empty() {
        return "(no tool calls were made)".to_string();
    }
    ledger
        .iter()
        .map(|record| {
            format!(
                "{} {}({}) -> {}",
                record.id, record.tool, record.args, record.result
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Opening instruction of an investigation
pub fn seed_instruction(
    alert: &Alert,
    target_confidence: f64,
    max_iterations: usize,
) -> String {
    format!(
        "You are investigating a live incident autonomously.\n\n\
         {alert}\n\n\
         <TELEMETRY_JSON>\n{telemetry}\n</TELEMETRY_JSON>\n\n\
         <LOGS>\n{logs}\n</LOGS>\n\n\
         GOAL:\n\
         - Use the available tools to gather evidence about the root cause.\n\
         - Call one tool at a time and read its result before deciding the next.\n\
         - Stop calling tools once you are at least {target:.0}% confident in a hypothesis.\n\
         - You have at most {budget} tool calls. When done, reply with a short plain-text note \
         of what you concluded instead of a tool call.",
        alert = alert_block(alert),
        telemetry = pretty(&alert.telemetry),
        logs = format_logs(alert),
        target = target_confidence * 100.0,
        budget = max_iterations,
    )
}

/// Final instruction appended to the exploration context
pub fn synthesis_instruction(runbooks: &[Runbook], ledger: &[ToolCallRecord]) -> String {
    format!(
        "Exploration is over. Produce the final incident report.\n\n\
         <RUNBOOKS_JSON>\n{runbooks}\n</RUNBOOKS_JSON>\n\n\
         <TOOL_RESULTS>\n{ledger}\n</TOOL_RESULTS>\n\n\
         OUTPUT REQUIREMENTS:\n\
         - summary and hypothesis MUST be grounded in evidenceLogs and evidenceRunbooks.\n\
         - evidenceLogs MUST contain LOG_* IDs from the provided logs.\n\
         - Cite TC_* IDs in citesToolCalls wherever a tool result supports a step.\n\
         - steps MUST be a decision tree using ifPassNext / ifFailNext.\n\
         - Include estimatedTimeSavedMinutes based on complexity.",
        runbooks = runbooks_json(runbooks),
        ledger = ledger_digest(ledger),
    )
}

/// Chat history as `ROLE: content` lines
pub fn format_history(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn refinement_prompt(
    alert: &Alert,
    runbooks: &[Runbook],
    ledger: &[ToolCallRecord],
    history: &[Message],
    finding: &str,
) -> String {
    format!(
        "Update the investigation plan based on new evidence provided by the engineer.\n\n\
         {alert}\n\n\
         <ORIGINAL_LOGS>\n{logs}\n</ORIGINAL_LOGS>\n\n\
         <RUNBOOKS_JSON>\n{runbooks}\n</RUNBOOKS_JSON>\n\n\
         <TOOL_RESULTS>\n{ledger}\n</TOOL_RESULTS>\n\n\
         <INVESTIGATION_HISTORY>\n{history}\n</INVESTIGATION_HISTORY>\n\n\
         <NEW_FINDING>\n{finding}\n</NEW_FINDING>\n\n\
         Incorporate this new finding into your hypothesis. If the finding confirms a \
         specific path, prioritize remediation steps from the runbooks.",
        alert = alert_block(alert),
        logs = format_logs(alert),
        runbooks = runbooks_json(runbooks),
        ledger = ledger_digest(ledger),
        history = format_history(history),
        finding = finding.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::demo;
    use chrono::Utc;

    #[test]
    fn seed_tags_logs_and_states_budget() {
        let alert = demo::find_alert("ALRT-001").unwrap();
        let seed = seed_instruction(&alert, 0.8, 8);
        assert!(seed.contains("LOG_1: "));
        assert!(seed.contains(&format!("LOG_{}: ", alert.logs.len())));
        assert!(seed.contains("at most 8 tool calls"));
        assert!(seed.contains("80%"));
        assert!(seed.contains("cpuUsage"));
    }

    #[test]
    fn runbooks_without_id_get_positional_id() {
        let mut runbooks = demo::runbooks();
        runbooks[1].id.clear();
        let json: Vec<Value> = serde_json::from_str(&runbooks_json(&runbooks)).unwrap();
        assert_eq!(json[0]["id"], runbooks[0].id.as_str());
        assert_eq!(json[1]["id"], "RB_2");
        assert_eq!(json[1]["name"], runbooks[1].name.as_str());
        assert_eq!(
            json[1]["likelyCauses"].as_array().map(Vec::len),
            Some(runbooks[1].likely_causes.len())
        );
    }

    #[test]
    fn digest_lists_every_record_in_order() {
        let ledger = vec![
            ToolCallRecord {
                id: "TC_1".into(),
                tool: "get_dependency_health".into(),
                args: json!({"service": "API"}),
                result: json!({"PaymentSvc": "Degraded"}),
                timestamp: Utc::now(),
            },
            ToolCallRecord {
                id: "TC_2".into(),
                tool: "search_logs".into(),
                args: json!({}),
                result: json!({"status": "error", "message": "no data"}),
                timestamp: Utc::now(),
            },
        ];
        let digest = ledger_digest(&ledger);
        let lines: Vec<&str> = digest.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("TC_1 get_dependency_health"));
        assert!(lines[0].contains("Degraded"));
        assert!(lines[1].starts_with("TC_2 search_logs"));
        assert_eq!(ledger_digest(&[]), "(no tool calls were made)");
    }

    #[test]
    fn history_uses_uppercase_roles() {
        let history = vec![
            Message::user("DB CPU is 30%"),
            Message::assistant("Then the pool is the suspect", None),
        ];
        assert_eq!(
            format_history(&history),
            "USER: DB CPU is 30%\nASSISTANT: Then the pool is the suspect"
        );
    }
}
