//! Conversation types for oracle communication
//!
//! These are NOT domain types - they're the wire-neutral shape of a
//! conversation that a transport converts into its provider format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool declaration passed to the oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Tool invocation requested by the oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    /// Opaque reasoning signature some providers require echoed back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Message role in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Content types that can be in a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },

    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        /// Tool name, needed by providers that key results by function name
        name: String,
        output: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Unified message format for oracle communication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMessage {
    pub role: Role,
    pub content: Vec<Content>,
}

impl ModelMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![Content::Text { text: text.into() }],
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![Content::Text { text: text.into() }],
        }
    }

    /// Assistant turn echoing a tool request back into the context
    pub fn tool_request(call: &AiToolCall) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![Content::ToolUse {
                id: call.id.clone(),
                name: call.name.clone(),
                input: call.arguments.clone(),
                signature: call.signature.clone(),
            }],
        }
    }

    /// User turn carrying the observation for a tool request
    pub fn tool_observation(call: &AiToolCall, output: Value, is_error: bool) -> Self {
        Self {
            role: Role::User,
            content: vec![Content::ToolResult {
                tool_use_id: call.id.clone(),
                name: call.name.clone(),
                output,
                is_error: is_error.then_some(true),
            }],
        }
    }
}
