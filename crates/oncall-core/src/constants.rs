//! Centralized constants

pub mod ai {
    /// Gemini REST endpoint root
    pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
    /// Environment variable holding the API key
    pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
    /// Fast model used while exploring with tools
    pub const DEFAULT_EXPLORATION_MODEL: &str = "gemini-3-flash-preview";
    /// Deep model used for the final report
    pub const DEFAULT_SYNTHESIS_MODEL: &str = "gemini-3-pro-preview";
    pub const DEFAULT_TEMPERATURE: f32 = 0.1;
    pub const DEFAULT_TOP_P: f32 = 0.95;
    pub const EXPLORATION_THINKING_BUDGET: u32 = 1024;
    pub const SYNTHESIS_THINKING_BUDGET: u32 = 8000;
    /// HTTP timeout for a single oracle request
    pub const REQUEST_TIMEOUT_SECS: u64 = 180;
}

pub mod investigation {
    /// Hard ceiling on tool-calling iterations
    pub const MAX_ITERATIONS: usize = 8;
    /// Pause before every oracle call after the first
    pub const INTER_CALL_PAUSE_MS: u64 = 1500;
    /// Confidence the oracle is asked to reach before it stops exploring
    pub const TARGET_CONFIDENCE: f64 = 0.8;
    /// Progress snapshots never report more than this
    pub const PROGRESS_CEILING: f64 = 0.7;
}

pub mod retry {
    pub const MAX_ATTEMPTS: u32 = 5;
    pub const INITIAL_DELAY_MS: u64 = 2000;
    pub const GROWTH_FACTOR: f64 = 1.5;
}

pub mod ui {
    pub const CONFIG_DIR_NAME: &str = ".oncall-copilot";
    pub const CONFIG_FILE_NAME: &str = "config.toml";
    pub const LOG_FILE_NAME: &str = "oncall-copilot.log";
}
