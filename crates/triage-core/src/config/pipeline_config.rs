use serde::{Deserialize, Serialize};

use super::defaults;

/// Calibration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// EMA step size for both reinforcement and decay.
    pub alpha: f64,
    /// Maximum number of log entries consumed per calibration run.
    pub max_window: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            alpha: defaults::DEFAULT_CALIBRATION_ALPHA,
            max_window: defaults::DEFAULT_CALIBRATION_MAX_WINDOW,
        }
    }
}

/// Per-item pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Per-assessor timeout in milliseconds.
    pub assessor_timeout_ms: u64,
    /// Items evaluated concurrently within one batch.
    pub max_concurrent_items: usize,
    /// Default batch size for `process_batch`.
    pub batch_limit: usize,
    /// Attempts per execution before it is deferred.
    pub executor_max_attempts: u32,
    /// Initial backoff between execution attempts (doubles each retry).
    pub executor_backoff_ms: u64,
    /// Path of the rule document loaded at startup.
    pub rules_path: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            assessor_timeout_ms: defaults::DEFAULT_ASSESSOR_TIMEOUT_MS,
            max_concurrent_items: defaults::DEFAULT_MAX_CONCURRENT_ITEMS,
            batch_limit: defaults::DEFAULT_BATCH_LIMIT,
            executor_max_attempts: defaults::DEFAULT_EXECUTOR_MAX_ATTEMPTS,
            executor_backoff_ms: defaults::DEFAULT_EXECUTOR_BACKOFF_MS,
            rules_path: defaults::DEFAULT_RULES_PATH.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            json_logs: defaults::DEFAULT_JSON_LOGS,
        }
    }
}
