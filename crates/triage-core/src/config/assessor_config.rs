use serde::{Deserialize, Serialize};

use super::defaults;

/// Mode detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    /// Authored timestamps older than this (relative to capture) mark an item as backfill.
    pub staleness_horizon_days: i64,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            staleness_horizon_days: defaults::DEFAULT_STALENESS_HORIZON_DAYS,
        }
    }
}

/// Routing assessor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Rules whose weight is within this distance of the best weight are tied.
    pub tie_epsilon: f64,
    /// Confidence multiplier applied in backfill mode.
    pub backfill_dampening: f64,
    /// Confidence emitted when no rule matches (at most 0.2).
    pub uncertain_confidence: f64,
    /// Number of reinforcing sequence numbers remembered per rule.
    pub provenance_cap: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            tie_epsilon: defaults::DEFAULT_TIE_EPSILON,
            backfill_dampening: defaults::DEFAULT_ROUTING_BACKFILL_DAMPENING,
            uncertain_confidence: defaults::DEFAULT_UNCERTAIN_CONFIDENCE,
            provenance_cap: defaults::DEFAULT_PROVENANCE_CAP,
        }
    }
}

/// Urgency assessor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyConfig {
    /// Confidence of a `whenever` classification when no signal fired.
    pub quiet_confidence: f64,
}

impl Default for UrgencyConfig {
    fn default() -> Self {
        Self {
            quiet_confidence: defaults::DEFAULT_QUIET_URGENCY_CONFIDENCE,
        }
    }
}

/// Excitement assessor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcitementConfig {
    /// Score multiplier applied in backfill mode.
    pub backfill_dampening: f64,
    /// Score every well-formed item starts from.
    pub base_score: f64,
}

impl Default for ExcitementConfig {
    fn default() -> Self {
        Self {
            backfill_dampening: defaults::DEFAULT_EXCITEMENT_BACKFILL_DAMPENING,
            base_score: defaults::DEFAULT_EXCITEMENT_BASE_SCORE,
        }
    }
}
