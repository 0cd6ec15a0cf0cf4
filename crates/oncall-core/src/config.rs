//! User configuration
//!
//! Read from `~/.oncall-copilot/config.toml`. Every key is optional; a missing
//! file means all defaults.
//!
//! ```toml
//! [investigation]
//! max_iterations = 8
//! inter_call_pause_ms = 1500
//!
//! [synthesis]
//! model = "gemini-3-pro-preview"
//! thinking_budget = 8000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::client::OracleProfile;
use crate::ai::RetryConfig;
use crate::constants;
use crate::paths;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvestigationSettings {
    pub max_iterations: usize,
    pub inter_call_pause_ms: u64,
    pub target_confidence: f64,
    pub progress_ceiling: f64,
}

impl Default for InvestigationSettings {
    fn default() -> Self {
        Self {
            max_iterations: constants::investigation::MAX_ITERATIONS,
            inter_call_pause_ms: constants::investigation::INTER_CALL_PAUSE_MS,
            target_confidence: constants::investigation::TARGET_CONFIDENCE,
            progress_ceiling: constants::investigation::PROGRESS_CEILING,
        }
    }
}

impl InvestigationSettings {
    pub fn inter_call_pause(&self) -> Duration {
        Duration::from_millis(self.inter_call_pause_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: constants::retry::MAX_ATTEMPTS,
            initial_delay_ms: constants::retry::INITIAL_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            base_url: constants::ai::DEFAULT_BASE_URL.to_string(),
            api_key_env: constants::ai::DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopilotConfig {
    pub investigation: InvestigationSettings,
    pub retry: RetrySettings,
    pub oracle: OracleSettings,
    pub exploration: OracleProfile,
    pub synthesis: OracleProfile,
}

impl Default for CopilotConfig {
    fn default() -> Self {
        Self {
            investigation: InvestigationSettings::default(),
            retry: RetrySettings::default(),
            oracle: OracleSettings::default(),
            exploration: OracleProfile::exploration(),
            synthesis: OracleProfile::synthesis(),
        }
    }
}

impl CopilotConfig {
    /// Load from the default location, falling back to defaults if absent
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&paths::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.sanitize();
        Ok(config)
    }

    /// Keep the loop well-formed whatever the file says
    pub(crate) fn sanitize(&mut self) {
        let inv = &mut self.investigation;
        inv.max_iterations = inv.max_iterations.max(1);
        if !inv.progress_ceiling.is_finite() || inv.progress_ceiling < 0.0 {
            inv.progress_ceiling = constants::investigation::PROGRESS_CEILING;
        }
        inv.progress_ceiling = inv.progress_ceiling.min(0.99);
        if !inv.target_confidence.is_finite() {
            inv.target_confidence = constants::investigation::TARGET_CONFIDENCE;
        }
        inv.target_confidence = inv.target_confidence.clamp(0.0, 1.0);
        self.retry.max_attempts = self.retry.max_attempts.max(1);
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.retry.max_attempts,
            initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config = CopilotConfig::from_toml_str("").unwrap();
        assert_eq!(config, CopilotConfig::default());
        assert_eq!(config.investigation.max_iterations, 8);
        assert_eq!(config.investigation.inter_call_pause_ms, 1500);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.synthesis.thinking_budget, 8000);
    }

    #[test]
    fn missing_keys_fall_back_per_field() {
        let config = CopilotConfig::from_toml_str(
            r#"
            [investigation]
            max_iterations = 3

            [synthesis]
            model = "gemini-2.5-pro"
            "#,
        )
        .unwrap();

        assert_eq!(config.investigation.max_iterations, 3);
        assert_eq!(config.investigation.inter_call_pause_ms, 1500);
        assert_eq!(config.synthesis.model, "gemini-2.5-pro");
        assert_eq!(config.exploration, OracleProfile::exploration());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = CopilotConfig::from_toml_str(
            r#"
            [investigation]
            max_iterations = 0
            progress_ceiling = 1.5

            [retry]
            max_attempts = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.investigation.max_iterations, 1);
        assert!(config.investigation.progress_ceiling < 1.0);
        assert_eq!(config.retry_config().max_attempts, 1);
    }

    #[test]
    fn loads_from_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.toml");
        assert_eq!(
            CopilotConfig::load_from(&missing).unwrap(),
            CopilotConfig::default()
        );

        let mut file = std::fs::File::create(&missing).unwrap();
        writeln!(file, "[retry]\ninitial_delay_ms = 250").unwrap();
        let config = CopilotConfig::load_from(&missing).unwrap();
        assert_eq!(
            config.retry_config().initial_delay,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            CopilotConfig::from_toml_str("[investigation\n"),
            Err(ConfigError::Parse(_))
        ));
    }
}
