//! Investigation agent
//!
//! - `orchestrator` - explore/synthesize state machine
//! - `refine` - follow-up refinement with a new finding
//! - `loop_events` - snapshot observers and loop phases
//! - `prompt` - prompt assembly

pub mod loop_events;
pub mod orchestrator;
pub mod prompt;
pub mod refine;

pub use loop_events::{Phase, SnapshotObserver};
pub use orchestrator::{run_investigation, spawn_investigation, InvestigationLoop};
pub use refine::refine_investigation;
