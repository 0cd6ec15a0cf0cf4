//! Plain-text rendering of alerts and snapshots

use std::fmt::Write;

use oncall_core::incident::{Alert, CopilotState};

pub fn alert_line(alert: &Alert) -> String {
    format!(
        "{:<9} {:<8} {:<10} {:<10} {}",
        alert.id,
        alert.severity.to_string(),
        alert.service,
        alert.region,
        alert.title
    )
}

/// One-line progress or a full report, depending on completion
pub fn snapshot(state: &CopilotState) -> String {
    if !state.is_investigation_complete {
        let latest = state
            .tool_calls
            .last()
            .map(|r| format!(" [{} {}]", r.id, r.tool))
            .unwrap_or_default();
        return format!(
            "... {} ({}%){}",
            state.summary,
            state.confidence_percent(),
            latest
        );
    }
    report(state)
}

pub fn report(state: &CopilotState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "SUMMARY     {}", state.summary);
    let _ = writeln!(
        out,
        "HYPOTHESIS  {} ({}% confidence)",
        state.hypothesis,
        state.confidence_percent()
    );
    if let Some(alt) = &state.alternative_hypothesis {
        let _ = writeln!(out, "ALTERNATIVE {}", alt);
    }
    if !state.evidence_logs.is_empty() || !state.evidence_runbooks.is_empty() {
        let _ = writeln!(
            out,
            "EVIDENCE    {}",
            state
                .evidence_logs
                .iter()
                .chain(&state.evidence_runbooks)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    if !state.tool_calls.is_empty() {
        let _ = writeln!(out, "\nTOOL CALLS");
        for record in &state.tool_calls {
            let _ = writeln!(out, "  {} {} -> {}", record.id, record.tool, record.result);
        }
    }

    if !state.steps.is_empty() {
        let _ = writeln!(out, "\nSTEPS");
        for step in &state.steps {
            let _ = writeln!(out, "  {}: {}", step.id, step.action);
            let _ = writeln!(out, "      why: {}", step.reason);
            let _ = writeln!(out, "      expect: {}", step.expectation);
            if let (Some(pass), Some(fail)) = (&step.if_pass_next, &step.if_fail_next) {
                let _ = writeln!(out, "      pass -> {}, fail -> {}", pass, fail);
            }
        }
    }

    for (title, items) in [
        ("QUESTIONS", &state.questions_to_ask),
        ("MISSING SIGNALS", &state.missing_signals),
    ] {
        if !items.is_empty() {
            let _ = writeln!(out, "\n{}", title);
            for item in items {
                let _ = writeln!(out, "  - {}", item);
            }
        }
    }

    if let Some(draft) = &state.communication_draft {
        let _ = writeln!(out, "\nSTATUS UPDATE\n  {}", draft);
    }
    let _ = write!(
        out,
        "\nEstimated time saved: {:.0} min",
        state.estimated_time_saved_minutes
    );
    out
}
