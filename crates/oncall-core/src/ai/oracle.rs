//! The oracle call boundary
//!
//! One call takes the ordered conversation plus either a tool catalogue or an
//! output schema (never both, see [`OutputContract`]) and comes back with a
//! tool request or a text payload.
//!
//! [`OutputContract`]: super::client::OutputContract

use async_trait::async_trait;
use thiserror::Error;

use super::client::CallOptions;
use super::retry::{has_rate_limit_marker, is_rate_limit_status, IsRateLimited};
use super::types::{AiToolCall, ModelMessage};

/// What the oracle answered with
#[derive(Debug, Clone)]
pub enum OracleReply {
    /// The oracle wants a tool run before it continues
    ToolRequest(AiToolCall),
    /// Plain payload; `None` when the response carried no text at all
    Text(Option<String>),
}

impl OracleReply {
    pub fn into_text(self) -> Option<String> {
        match self {
            OracleReply::Text(text) => text,
            OracleReply::ToolRequest(_) => None,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum OracleError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed oracle reply: {0}")]
    MalformedReply(String),

    #[error("no API key found in environment variable {0}")]
    MissingApiKey(String),
}

impl IsRateLimited for OracleError {
    fn is_rate_limited(&self) -> bool {
        match self {
            OracleError::Status { status, message } => {
                is_rate_limit_status(*status) || has_rate_limit_marker(message)
            }
            OracleError::Transport(message) => has_rate_limit_marker(message),
            OracleError::MalformedReply(_) | OracleError::MissingApiKey(_) => false,
        }
    }
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => OracleError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => OracleError::Transport(err.to_string()),
        }
    }
}

/// Reasoning service handle. Injected; no process-wide client.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn generate(
        &self,
        conversation: &[ModelMessage],
        options: &CallOptions,
    ) -> Result<OracleReply, OracleError>;
}
