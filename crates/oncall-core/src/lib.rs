//! Core library for the On-Call Copilot
//!
//! An incident-investigation assistant that drives a reasoning oracle through
//! a bounded tool-calling loop and then asks it for a structured report.
//!
//! ## Layout
//! - `agent` - Investigation loop, snapshot observers, prompt assembly, refinement
//! - `ai` - Oracle boundary, conversation types, structured-output codec, retry
//! - `incident` - Alerts, runbooks, the report state, demo data
//! - `tools` - Tool catalogue, result sources, executor
//! - `config` / `paths` - TOML configuration and on-disk locations

pub mod agent;
pub mod ai;
pub mod config;
pub mod constants;
pub mod error;
pub mod incident;
pub mod paths;
pub mod tools;

pub use agent::{
    refine_investigation, run_investigation, spawn_investigation, InvestigationLoop,
    SnapshotObserver,
};
pub use config::CopilotConfig;
pub use error::InvestigationError;
pub use incident::{Alert, CopilotState, Runbook};
