//! Follow-up refinement of a finished investigation
//!
//! The engineer reports something new ("DB CPU is only 30%"); one
//! schema-constrained call folds it into an updated report. No tools are
//! offered, and the existing ledger is carried over untouched.

use tracing::info;

use crate::ai::decode_structured;
use crate::ai::types::ModelMessage;
use crate::error::InvestigationError;
use crate::incident::{Alert, CopilotState, Message, Runbook};

use super::orchestrator::{finalize, synthesis_options, InvestigationLoop};
use super::prompt;

impl InvestigationLoop {
    /// Refine `previous` with a new finding.
    ///
    /// `history` is the chat so far, oldest first, not including `finding`.
    pub async fn refine(
        &self,
        alert: &Alert,
        runbooks: &[Runbook],
        previous: &CopilotState,
        history: &[Message],
        finding: &str,
    ) -> Result<CopilotState, InvestigationError> {
        if finding.trim().is_empty() {
            return Err(InvestigationError::EmptyFinding);
        }

        info!(
            alert_id = %alert.id,
            history = history.len(),
            "Refining investigation"
        );

        let conversation = vec![ModelMessage::user_text(prompt::refinement_prompt(
            alert,
            runbooks,
            &previous.tool_calls,
            history,
            finding,
        ))];
        let options = synthesis_options(&self.config.synthesis);

        let text = self.call_oracle(&conversation, &options).await?.into_text();
        let report: CopilotState = decode_structured(text.as_deref())?;

        Ok(finalize(report, previous.tool_calls.clone()))
    }
}

/// See [`InvestigationLoop::refine`].
pub async fn refine_investigation(
    investigation: &InvestigationLoop,
    alert: &Alert,
    runbooks: &[Runbook],
    previous: &CopilotState,
    history: &[Message],
    finding: &str,
) -> Result<CopilotState, InvestigationError> {
    investigation
        .refine(alert, runbooks, previous, history, finding)
        .await
}
