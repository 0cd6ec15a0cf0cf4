//! Investigation orchestrator: the bounded explore-then-synthesize loop.
//!
//! ```text
//!  Exploring ──(no tool request | K reached)──► Synthesizing ──► Complete
//!     │  ▲
//!     └──┘ tool request: resolve, append to ledger + context, emit snapshot
//! ```
//!
//! One investigation is a strictly sequential chain of oracle calls. The
//! oracle and tool source are shared behind `Arc`, so independent
//! investigations can run side by side on the same handles.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ai::client::{CallOptions, OracleProfile};
use crate::ai::oracle::{Oracle, OracleError, OracleReply};
use crate::ai::schema::report_schema;
use crate::ai::types::{Content, ModelMessage, Role};
use crate::ai::{decode_structured, with_retry};
use crate::config::CopilotConfig;
use crate::error::InvestigationError;
use crate::incident::{Alert, CopilotState, Runbook, ToolCallRecord};
use crate::tools::{no_data, ToolExecutor, ToolRegistry, ToolResultSource};

use super::loop_events::{Phase, SnapshotObserver};
use super::prompt;

/// Enforces the fixed pause before every oracle call after the first.
///
/// Independent of retry backoff; a retried call counts once.
pub(crate) struct CallPacer {
    pause: Duration,
    calls: usize,
}

impl CallPacer {
    pub(crate) fn new(pause: Duration) -> Self {
        Self { pause, calls: 0 }
    }

    pub(crate) async fn ready(&mut self) {
        if self.calls > 0 && !self.pause.is_zero() {
            tokio::time::sleep(self.pause).await;
        }
        self.calls += 1;
    }
}

/// Drives investigations against an injected oracle and tool source.
#[derive(Clone)]
pub struct InvestigationLoop {
    pub(crate) oracle: Arc<dyn Oracle>,
    executor: ToolExecutor,
    pub(crate) config: CopilotConfig,
}

impl InvestigationLoop {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        source: Arc<dyn ToolResultSource>,
        mut config: CopilotConfig,
    ) -> Self {
        config.sanitize();
        let registry = Arc::new(ToolRegistry::incident_catalogue());
        Self {
            oracle,
            executor: ToolExecutor::new(registry, source),
            config,
        }
    }

    pub fn config(&self) -> &CopilotConfig {
        &self.config
    }

    /// One oracle call, with rate-limit retry
    pub(crate) async fn call_oracle(
        &self,
        conversation: &[ModelMessage],
        options: &CallOptions,
    ) -> Result<OracleReply, OracleError> {
        let retry = self.config.retry_config();
        let oracle = &self.oracle;
        with_retry(&retry, || oracle.generate(conversation, options)).await
    }

    /// Run one investigation to completion.
    ///
    /// Every progress snapshot and the final report go to `observer`, in
    /// order. On error nothing further is emitted.
    pub async fn run(
        &self,
        alert: &Alert,
        runbooks: &[Runbook],
        observer: &dyn SnapshotObserver,
    ) -> Result<CopilotState, InvestigationError> {
        let settings = &self.config.investigation;
        let max_iterations = settings.max_iterations.max(1);

        info!(
            alert_id = %alert.id,
            service = %alert.service,
            max_iterations,
            "Starting investigation"
        );

        let exploration = CallOptions::with_tools(
            self.config.exploration.clone(),
            self.executor.registry().get_ai_tools(),
        )
        .system_prompt(prompt::SYSTEM_PROMPT);

        let mut conversation = vec![ModelMessage::user_text(prompt::seed_instruction(
            alert,
            settings.target_confidence,
            max_iterations,
        ))];
        let mut ledger: Vec<ToolCallRecord> = Vec::new();
        let mut pacer = CallPacer::new(settings.inter_call_pause());
        let mut phase = Phase::Exploring { iteration: 0 };

        loop {
            phase = match phase {
                Phase::Exploring { iteration } if iteration >= max_iterations => {
                    info!(alert_id = %alert.id, iteration, "Iteration ceiling reached");
                    Phase::Synthesizing
                }

                Phase::Exploring { iteration } => {
                    pacer.ready().await;
                    let reply = self.call_oracle(&conversation, &exploration).await?;

                    match reply {
                        OracleReply::ToolRequest(call) => {
                            let iteration = iteration + 1;
                            let record = self
                                .executor
                                .resolve(&alert.id, &call, ledger.len() + 1)
                                .await;
                            info!(
                                alert_id = %alert.id,
                                iteration,
                                tool = %record.tool,
                                call_id = %record.id,
                                "Tool resolved"
                            );

                            let is_miss = record.result == no_data();
                            conversation.push(ModelMessage::tool_request(&call));
                            conversation.push(ModelMessage::tool_observation(
                                &call,
                                record.result.clone(),
                                is_miss,
                            ));
                            ledger.push(record);

                            observer.on_snapshot(&self.progress_snapshot(
                                iteration,
                                max_iterations,
                                &ledger,
                            ));
                            Phase::Exploring { iteration }
                        }
                        OracleReply::Text(text) => {
                            debug!(
                                alert_id = %alert.id,
                                iteration,
                                has_text = text.is_some(),
                                "Oracle stopped requesting tools"
                            );
                            if let Some(text) = text {
                                conversation.push(ModelMessage::assistant_text(text));
                            }
                            Phase::Synthesizing
                        }
                    }
                }

                Phase::Synthesizing => {
                    let report = self
                        .synthesize(&mut conversation, &mut pacer, runbooks, &ledger)
                        .await
                        .inspect_err(|e| {
                            warn!(alert_id = %alert.id, error = %e, "Synthesis failed")
                        })?;
                    Phase::Complete(Box::new(report))
                }

                Phase::Complete(report) => {
                    let final_state = finalize(*report, ledger);
                    info!(
                        alert_id = %alert.id,
                        tool_calls = final_state.tool_calls.len(),
                        confidence = final_state.confidence_percent(),
                        "Investigation complete"
                    );
                    observer.on_snapshot(&final_state);
                    return Ok(final_state);
                }
            };
        }
    }

    async fn synthesize(
        &self,
        conversation: &mut Vec<ModelMessage>,
        pacer: &mut CallPacer,
        runbooks: &[Runbook],
        ledger: &[ToolCallRecord],
    ) -> Result<CopilotState, InvestigationError> {
        let instruction = prompt::synthesis_instruction(runbooks, ledger);
        // Fold into a trailing user turn rather than sending two in a row
        match conversation.last_mut() {
            Some(last) if last.role == Role::User => {
                last.content.push(Content::Text { text: instruction })
            }
            _ => conversation.push(ModelMessage::user_text(instruction)),
        }
        let options = synthesis_options(&self.config.synthesis);

        pacer.ready().await;
        let text = self.call_oracle(conversation, &options).await?.into_text();
        Ok(decode_structured::<CopilotState>(text.as_deref())?)
    }

    fn progress_snapshot(
        &self,
        iteration: usize,
        max_iterations: usize,
        ledger: &[ToolCallRecord],
    ) -> CopilotState {
        let ceiling = self.config.investigation.progress_ceiling;
        let latest = ledger.last().map(|r| r.tool.as_str()).unwrap_or("tools");
        CopilotState {
            summary: format!(
                "Investigating autonomously ({}/{} tool calls)",
                iteration, max_iterations
            ),
            hypothesis: format!("Gathering evidence, last checked: {}", latest),
            confidence: ceiling * iteration as f64 / max_iterations as f64,
            tool_calls: ledger.to_vec(),
            is_investigation_complete: false,
            ..Default::default()
        }
    }

    /// Run on a tokio task, streaming snapshots through a channel
    pub fn spawn(
        self,
        alert: Alert,
        runbooks: Vec<Runbook>,
    ) -> (
        mpsc::UnboundedReceiver<CopilotState>,
        JoinHandle<Result<CopilotState, InvestigationError>>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move { self.run(&alert, &runbooks, &tx).await });
        (rx, handle)
    }
}

/// Options for schema-constrained calls (synthesis and refinement)
pub(crate) fn synthesis_options(profile: &OracleProfile) -> CallOptions {
    CallOptions::with_schema(profile.clone(), report_schema()).system_prompt(prompt::SYSTEM_PROMPT)
}

/// Attach the ledger, mark complete, repair confidence
pub(crate) fn finalize(mut report: CopilotState, ledger: Vec<ToolCallRecord>) -> CopilotState {
    report.tool_calls = ledger;
    report.is_investigation_complete = true;
    report.repair_confidence();
    report
}

/// Run an investigation with default configuration.
pub async fn run_investigation(
    oracle: Arc<dyn Oracle>,
    source: Arc<dyn ToolResultSource>,
    alert: &Alert,
    runbooks: &[Runbook],
    observer: &dyn SnapshotObserver,
) -> Result<CopilotState, InvestigationError> {
    InvestigationLoop::new(oracle, source, CopilotConfig::default())
        .run(alert, runbooks, observer)
        .await
}

/// Spawn an investigation; see [`InvestigationLoop::spawn`].
pub fn spawn_investigation(
    investigation: InvestigationLoop,
    alert: Alert,
    runbooks: Vec<Runbook>,
) -> (
    mpsc::UnboundedReceiver<CopilotState>,
    JoinHandle<Result<CopilotState, InvestigationError>>,
) {
    investigation.spawn(alert, runbooks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::oracle::testing::ScriptedOracle;
    use crate::ai::DecodeError;
    use crate::incident::demo;
    use crate::tools::StaticToolTable;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::time::Instant;

    const REPORT: &str = r#"{
        "summary": "API 5xx caused by PaymentSvc timeouts (LOG_2, TC_1)",
        "hypothesis": "PaymentSvc degradation per RB-A",
        "confidence": 0.82,
        "evidenceLogs": ["LOG_2"],
        "evidenceRunbooks": ["RB-A"],
        "steps": [{
            "id": "S1",
            "action": "Check PaymentSvc dashboards",
            "reason": "TC_1 reports PaymentSvc Degraded",
            "expectation": "Elevated latency",
            "citesLogs": ["LOG_2"],
            "citesRunbooks": ["RB-A"],
            "citesToolCalls": ["TC_1"],
            "ifPassNext": "END",
            "ifFailNext": "END"
        }],
        "questionsToAsk": [],
        "missingSignals": [],
        "estimatedTimeSavedMinutes": 20
    }"#;

    fn investigation(oracle: Arc<ScriptedOracle>) -> InvestigationLoop {
        let mut config = CopilotConfig::default();
        config.retry.initial_delay_ms = 100;
        InvestigationLoop::new(oracle, Arc::new(demo::tool_table()), config)
    }

    fn alert() -> Alert {
        demo::find_alert("ALRT-001").unwrap()
    }

    fn collector() -> (Arc<Mutex<Vec<CopilotState>>>, impl SnapshotObserver) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |s: &CopilotState| {
            sink.lock().unwrap().push(s.clone())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn dependency_health_scenario_completes_with_one_tool_call() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .explore_tool("get_dependency_health", json!({"service": "API"}))
                .synthesize_text(REPORT),
        );
        let (seen, observer) = collector();

        let state = investigation(oracle.clone())
            .run(&alert(), &demo::runbooks(), &observer)
            .await
            .unwrap();

        assert!(state.is_investigation_complete);
        assert_eq!(state.tool_calls.len(), 1);
        assert_eq!(state.tool_calls[0].tool, "get_dependency_health");
        assert_eq!(state.tool_calls[0].id, "TC_1");
        assert_eq!(state.tool_calls[0].result["PaymentSvc"], "Degraded");
        assert_eq!(state.confidence_percent(), 82);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(!seen[0].is_investigation_complete);
        assert_eq!(seen[1], state);

        // tool call, stop turn, synthesis
        assert_eq!(oracle.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn ceiling_forces_synthesis_after_eight_tool_calls() {
        let oracle = Arc::new(
            ScriptedOracle::repeating_tool("get_dependency_health").synthesize_text(REPORT),
        );
        let (seen, observer) = collector();

        let state = investigation(oracle.clone())
            .run(&alert(), &demo::runbooks(), &observer)
            .await
            .unwrap();

        assert_eq!(state.tool_calls.len(), 8);
        let ids: Vec<&str> = state.tool_calls.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["TC_1", "TC_2", "TC_3", "TC_4", "TC_5", "TC_6", "TC_7", "TC_8"]);
        assert!(state.is_investigation_complete);

        let calls = oracle.calls();
        assert_eq!(calls.len(), 9);
        assert!(calls[..8].iter().all(|c| c.declared_tools == Some(4)));
        assert!(calls[8].declared_schema);
        assert_eq!(seen.lock().unwrap().len(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn progress_snapshots_grow_monotonically_below_ceiling() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .explore_tool("get_dependency_health", json!({"service": "API"}))
                .explore_tool("get_recent_deploys", json!({"service": "API"}))
                .explore_tool("search_logs", json!({"service": "API", "pattern": "timeout"}))
                .synthesize_text(REPORT),
        );
        let (seen, observer) = collector();

        investigation(oracle)
            .run(&alert(), &demo::runbooks(), &observer)
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        let progress = &seen[..seen.len() - 1];
        assert_eq!(progress.len(), 3);
        for (i, snapshot) in progress.iter().enumerate() {
            assert_eq!(snapshot.tool_calls.len(), i + 1);
            assert!(snapshot.steps.is_empty());
            assert!(snapshot.evidence_logs.is_empty());
            assert!(snapshot.confidence < 0.7);
        }
        assert!(progress
            .windows(2)
            .all(|w| w[1].confidence > w[0].confidence));
        assert!((progress[2].confidence - 0.7 * 3.0 / 8.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn ceiling_set_in_code_is_clamped_below_one() {
        let oracle = Arc::new(
            ScriptedOracle::repeating_tool("get_dependency_health").synthesize_text(REPORT),
        );
        let mut config = CopilotConfig::default();
        config.investigation.progress_ceiling = 1.5;
        config.investigation.max_iterations = 1;
        let investigation = InvestigationLoop::new(oracle, Arc::new(demo::tool_table()), config);
        assert!(investigation.config().investigation.progress_ceiling < 1.0);

        let (seen, observer) = collector();
        investigation
            .run(&alert(), &demo::runbooks(), &observer)
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(!seen[0].is_investigation_complete);
        assert!(seen[0].confidence < 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_between_consecutive_calls() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .explore_tool("get_dependency_health", json!({"service": "API"}))
                .synthesize_text(REPORT),
        );
        let start = Instant::now();

        investigation(oracle)
            .run(&alert(), &demo::runbooks(), &|_: &CopilotState| {})
            .await
            .unwrap();

        // three calls, two pauses
        assert!(start.elapsed() >= Duration::from_millis(2 * 1500));
    }

    #[tokio::test(start_paused = true)]
    async fn synthesis_decode_failure_propagates_without_final_snapshot() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .explore_tool("get_dependency_health", json!({"service": "API"}))
                .synthesize_text("I could not produce JSON this time."),
        );
        let (seen, observer) = collector();

        let err = investigation(oracle)
            .run(&alert(), &demo::runbooks(), &observer)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InvestigationError::Decode(DecodeError::UnparsableResponse { .. })
        ));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].is_investigation_complete);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_synthesis_is_empty_response() {
        let oracle = Arc::new(
            ScriptedOracle::new().synthesize(Ok(OracleReply::Text(None))),
        );

        let err = investigation(oracle)
            .run(&alert(), &demo::runbooks(), &|_: &CopilotState| {})
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InvestigationError::Decode(DecodeError::EmptyResponse)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_turn_is_retried_inside_the_loop() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .explore(Err(OracleError::Status {
                    status: 429,
                    message: "RESOURCE_EXHAUSTED".into(),
                }))
                .explore_tool("get_dependency_health", json!({"service": "API"}))
                .synthesize_text(REPORT),
        );

        let state = investigation(oracle.clone())
            .run(&alert(), &demo::runbooks(), &|_: &CopilotState| {})
            .await
            .unwrap();

        assert_eq!(state.tool_calls.len(), 1);
        assert_eq!(oracle.calls().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_oracle_failure_propagates() {
        let oracle = Arc::new(ScriptedOracle::new().explore(Err(OracleError::Status {
            status: 400,
            message: "invalid argument".into(),
        })));
        let (seen, observer) = collector();

        let err = investigation(oracle.clone())
            .run(&alert(), &demo::runbooks(), &observer)
            .await
            .unwrap_err();

        assert!(matches!(err, InvestigationError::Oracle(OracleError::Status { status: 400, .. })));
        assert_eq!(oracle.calls().len(), 1);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_tool_data_is_recorded_as_no_data() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .explore_tool("query_metrics", json!({"service": "API", "metric": "p99"}))
                .synthesize_text(REPORT),
        );

        let state = investigation(oracle.clone())
            .run(&alert(), &demo::runbooks(), &|_: &CopilotState| {})
            .await
            .unwrap();

        assert_eq!(state.tool_calls[0].result, no_data());
        let synthesis = oracle.calls().last().unwrap().transcript();
        assert!(synthesis.contains("TC_1 query_metrics"));
    }

    #[tokio::test(start_paused = true)]
    async fn synthesis_sees_runbooks_and_ledger_with_schema_only() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .explore_tool("get_dependency_health", json!({"service": "API"}))
                .synthesize_text(REPORT),
        );

        investigation(oracle.clone())
            .run(&alert(), &demo::runbooks(), &|_: &CopilotState| {})
            .await
            .unwrap();

        let calls = oracle.calls();
        let exploration = &calls[0];
        let synthesis = calls.last().unwrap();

        assert_eq!(exploration.model, OracleProfile::exploration().model);
        assert!(!exploration.declared_schema);
        assert!(exploration.transcript().contains("LOG_1: "));

        assert_eq!(synthesis.model, OracleProfile::synthesis().model);
        assert_eq!(synthesis.declared_tools, None);
        let transcript = synthesis.transcript();
        assert!(transcript.contains("<RUNBOOKS_JSON>"));
        assert!(transcript.contains("RB-A"));
        assert!(transcript.contains("TC_1 get_dependency_health"));
    }

    #[tokio::test(start_paused = true)]
    async fn percent_confidence_is_repaired() {
        let report = REPORT.replace("\"confidence\": 0.82", "\"confidence\": 85");
        let oracle = Arc::new(ScriptedOracle::new().synthesize_text(&report));

        let state = investigation(oracle)
            .run(&alert(), &demo::runbooks(), &|_: &CopilotState| {})
            .await
            .unwrap();

        assert!((state.confidence - 0.85).abs() < 1e-9);
        assert!(state.tool_calls.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_investigation_streams_snapshots() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .explore_tool("get_dependency_health", json!({"service": "API"}))
                .synthesize_text(REPORT),
        );
        let table: Arc<dyn ToolResultSource> = Arc::new(StaticToolTable::new());
        let investigation = InvestigationLoop::new(oracle, table, CopilotConfig::default());

        let (mut rx, handle) =
            spawn_investigation(investigation, alert(), demo::runbooks());

        let mut received = Vec::new();
        while let Some(snapshot) = rx.recv().await {
            received.push(snapshot);
        }
        let state = handle.await.unwrap().unwrap();

        assert_eq!(received.len(), 2);
        assert_eq!(received.last(), Some(&state));
        assert_eq!(state.tool_calls[0].result, no_data());
    }
}
