use triage_core::config::{ModeThresholds, ThresholdConfig};
use triage_core::errors::{TriageError, TriageResult};
use triage_core::models::Mode;

/// Validated cut points keyed by mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTable {
    backfill: ModeThresholds,
    live: ModeThresholds,
}

impl ThresholdTable {
    pub fn new(config: &ThresholdConfig) -> TriageResult<Self> {
        for (mode, t) in [(Mode::Backfill, &config.backfill), (Mode::Live, &config.live)] {
            t.check()
                .map_err(|e| TriageError::ConfigError(format!("thresholds.{mode}: {e}")))?;
        }
        Ok(Self {
            backfill: config.backfill,
            live: config.live,
        })
    }

    pub fn for_mode(&self, mode: Mode) -> &ModeThresholds {
        match mode {
            Mode::Backfill => &self.backfill,
            Mode::Live => &self.live,
        }
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            backfill: ModeThresholds::backfill(),
            live: ModeThresholds::live(),
        }
    }
}
