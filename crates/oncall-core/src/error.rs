//! Investigation errors

use thiserror::Error;

use crate::ai::{DecodeError, OracleError};

/// Why an investigation or refinement did not produce a report
#[derive(Debug, Clone, Error)]
pub enum InvestigationError {
    /// The oracle failed and retries did not recover it
    #[error("oracle call failed: {0}")]
    Oracle(#[from] OracleError),

    /// The synthesis payload could not be decoded into a report
    #[error("could not decode report: {0}")]
    Decode(#[from] DecodeError),

    #[error("refinement requires a non-empty finding")]
    EmptyFinding,
}
