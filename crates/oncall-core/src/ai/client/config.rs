//! AI Client configuration
//!
//! Connection settings, per-tier model profiles, and per-call options.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::types::AiTool;
use crate::constants;

/// Configuration for the AI client
#[derive(Debug, Clone)]
pub struct AiClientConfig {
    /// REST root, e.g. `https://generativelanguage.googleapis.com/v1beta`
    pub base_url: String,
    pub api_key: String,
    pub request_timeout: Duration,
}

impl AiClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: constants::ai::DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(constants::ai::REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get the generateContent URL for a model
    pub fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

/// Model tier: which model, how deterministic, how much thinking.
///
/// Exploration wants fast turns; synthesis wants depth. Neither choice
/// changes the shape of the loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleProfile {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    /// Internal reasoning budget in tokens; 0 disables thinking
    pub thinking_budget: u32,
}

impl Default for OracleProfile {
    fn default() -> Self {
        Self::exploration()
    }
}

impl OracleProfile {
    pub fn exploration() -> Self {
        Self {
            model: constants::ai::DEFAULT_EXPLORATION_MODEL.to_string(),
            temperature: constants::ai::DEFAULT_TEMPERATURE,
            top_p: constants::ai::DEFAULT_TOP_P,
            thinking_budget: constants::ai::EXPLORATION_THINKING_BUDGET,
        }
    }

    pub fn synthesis() -> Self {
        Self {
            model: constants::ai::DEFAULT_SYNTHESIS_MODEL.to_string(),
            temperature: constants::ai::DEFAULT_TEMPERATURE,
            top_p: constants::ai::DEFAULT_TOP_P,
            thinking_budget: constants::ai::SYNTHESIS_THINKING_BUDGET,
        }
    }
}

/// What a call declares: tools to pick from, or a schema to fill.
#[derive(Debug, Clone)]
pub enum OutputContract {
    Tools(Vec<AiTool>),
    Schema(Value),
}

/// Call options for one oracle request
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub profile: OracleProfile,
    pub system_prompt: Option<String>,
    pub contract: OutputContract,
}

impl CallOptions {
    pub fn with_tools(profile: OracleProfile, tools: Vec<AiTool>) -> Self {
        Self {
            profile,
            system_prompt: None,
            contract: OutputContract::Tools(tools),
        }
    }

    pub fn with_schema(profile: OracleProfile, schema: Value) -> Self {
        Self {
            profile,
            system_prompt: None,
            contract: OutputContract::Schema(schema),
        }
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_url_trims_trailing_slash() {
        let config = AiClientConfig::new("key").with_base_url("http://localhost:9000/v1beta/");
        assert_eq!(
            config.generate_url("gemini-3-pro-preview"),
            "http://localhost:9000/v1beta/models/gemini-3-pro-preview:generateContent"
        );
    }

    #[test]
    fn profile_fields_default_individually() {
        let profile: OracleProfile = toml::from_str("model = \"custom\"").unwrap();
        assert_eq!(profile.model, "custom");
        assert_eq!(
            profile.thinking_budget,
            constants::ai::EXPLORATION_THINKING_BUDGET
        );
    }
}
