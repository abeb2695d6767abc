use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::Mode;

/// Cut points for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeThresholds {
    /// Routing confidence at or above which silent auto-store is permitted.
    pub store_min: f64,
    /// Excitement at or above which the item is surfaced.
    pub surface_min: f64,
    /// Value signals at or below this mark content as not worth keeping.
    pub discard_max: f64,
    /// Routing confidence below this is too uncertain to act on.
    pub routing_floor: f64,
}

impl ModeThresholds {
    pub fn backfill() -> Self {
        Self {
            store_min: defaults::DEFAULT_BACKFILL_STORE_MIN,
            surface_min: defaults::DEFAULT_BACKFILL_SURFACE_MIN,
            discard_max: defaults::DEFAULT_BACKFILL_DISCARD_MAX,
            routing_floor: defaults::DEFAULT_BACKFILL_ROUTING_FLOOR,
        }
    }

    pub fn live() -> Self {
        Self {
            store_min: defaults::DEFAULT_LIVE_STORE_MIN,
            surface_min: defaults::DEFAULT_LIVE_SURFACE_MIN,
            discard_max: defaults::DEFAULT_LIVE_DISCARD_MAX,
            routing_floor: defaults::DEFAULT_LIVE_ROUTING_FLOOR,
        }
    }

    /// Check range and ordering. Returns a description of the first problem.
    pub fn check(&self) -> Result<(), String> {
        for (name, v) in [
            ("store_min", self.store_min),
            ("surface_min", self.surface_min),
            ("discard_max", self.discard_max),
            ("routing_floor", self.routing_floor),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(format!("{name} = {v} is outside [0, 1]"));
            }
        }
        if self.discard_max >= self.store_min {
            return Err(format!(
                "discard_max ({}) must be below store_min ({})",
                self.discard_max, self.store_min
            ));
        }
        if self.routing_floor > self.store_min {
            return Err(format!(
                "routing_floor ({}) must not exceed store_min ({})",
                self.routing_floor, self.store_min
            ));
        }
        Ok(())
    }
}

/// Threshold table keyed by mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub backfill: ModeThresholds,
    pub live: ModeThresholds,
}

impl ThresholdConfig {
    pub fn for_mode(&self, mode: Mode) -> &ModeThresholds {
        match mode {
            Mode::Backfill => &self.backfill,
            Mode::Live => &self.live,
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            backfill: ModeThresholds::backfill(),
            live: ModeThresholds::live(),
        }
    }
}
