//! Oracle client
//!
//! - `config` - Client configuration, model profiles, per-call options
//! - `gemini` - HTTP transport for the Gemini `generateContent` API

mod config;
mod gemini;

pub use config::{AiClientConfig, CallOptions, OracleProfile, OutputContract};
pub use gemini::GeminiClient;
