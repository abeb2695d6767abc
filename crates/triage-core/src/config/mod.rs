//! Configuration loaded from TOML. Every section falls back to defaults.

pub mod assessor_config;
pub mod defaults;
pub mod pipeline_config;
pub mod storage_config;
pub mod threshold_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use assessor_config::{ExcitementConfig, ModeConfig, RoutingConfig, UrgencyConfig};
pub use pipeline_config::{CalibrationConfig, ObservabilityConfig, PipelineConfig};
pub use storage_config::StorageConfig;
pub use threshold_config::{ModeThresholds, ThresholdConfig};

use crate::constants::MAX_UNCERTAIN_ROUTING_CONFIDENCE;
use crate::errors::{TriageError, TriageResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub storage: StorageConfig,
    pub mode: ModeConfig,
    pub routing: RoutingConfig,
    pub urgency: UrgencyConfig,
    pub excitement: ExcitementConfig,
    pub thresholds: ThresholdConfig,
    pub calibration: CalibrationConfig,
    pub pipeline: PipelineConfig,
    pub observability: ObservabilityConfig,
}

impl TriageConfig {
    /// Parse from a TOML string and validate.
    pub fn from_toml(toml_str: &str) -> TriageResult<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| TriageError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> TriageResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TriageError::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&raw)
    }

    /// Reject values the engine cannot honour.
    pub fn validate(&self) -> TriageResult<()> {
        let bad = |msg: String| Err(TriageError::ConfigError(msg));

        if self.mode.staleness_horizon_days < 0 {
            return bad("mode.staleness_horizon_days must be non-negative".into());
        }
        for (name, v) in [
            ("routing.backfill_dampening", self.routing.backfill_dampening),
            ("excitement.backfill_dampening", self.excitement.backfill_dampening),
            ("excitement.base_score", self.excitement.base_score),
            ("urgency.quiet_confidence", self.urgency.quiet_confidence),
            ("routing.tie_epsilon", self.routing.tie_epsilon),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return bad(format!("{name} = {v} is outside [0, 1]"));
            }
        }
        if !(0.0..=MAX_UNCERTAIN_ROUTING_CONFIDENCE).contains(&self.routing.uncertain_confidence) {
            return bad(format!(
                "routing.uncertain_confidence must be within [0, {MAX_UNCERTAIN_ROUTING_CONFIDENCE}]"
            ));
        }
        if !(self.calibration.alpha > 0.0 && self.calibration.alpha < 1.0) {
            return bad("calibration.alpha must be in (0, 1)".into());
        }
        if self.calibration.max_window == 0 {
            return bad("calibration.max_window must be positive".into());
        }
        if self.pipeline.max_concurrent_items == 0 {
            return bad("pipeline.max_concurrent_items must be positive".into());
        }
        if self.pipeline.executor_max_attempts == 0 {
            return bad("pipeline.executor_max_attempts must be positive".into());
        }
        self.thresholds
            .backfill
            .check()
            .map_err(|e| TriageError::ConfigError(format!("thresholds.backfill: {e}")))?;
        self.thresholds
            .live
            .check()
            .map_err(|e| TriageError::ConfigError(format!("thresholds.live: {e}")))?;
        Ok(())
    }
}
