//! Centralized path utilities
//!
//! All application paths in one place for consistency

use std::path::PathBuf;

use crate::constants::ui;

/// Get the config directory (~/.oncall-copilot)
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(ui::CONFIG_DIR_NAME)
}

/// Get the config file (~/.oncall-copilot/config.toml)
pub fn config_path() -> PathBuf {
    config_dir().join(ui::CONFIG_FILE_NAME)
}

/// Get the logs directory (~/.oncall-copilot/logs)
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Get the log file path (~/.oncall-copilot/logs/oncall-copilot.log)
pub fn log_file_path() -> PathBuf {
    logs_dir().join(ui::LOG_FILE_NAME)
}
