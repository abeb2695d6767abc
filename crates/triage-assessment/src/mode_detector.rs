//! Backfill/Live classification from item metadata.

use chrono::Duration;

use triage_core::config::ModeConfig;
use triage_core::models::{Item, Mode};

/// Pure, deterministic mode classifier.
#[derive(Debug, Clone, Copy)]
pub struct ModeDetector {
    horizon: Duration,
}

impl ModeDetector {
    pub fn new(config: &ModeConfig) -> Self {
        Self::with_horizon_days(config.staleness_horizon_days)
    }

    pub fn with_horizon_days(days: i64) -> Self {
        Self {
            horizon: Duration::days(days.max(0)),
        }
    }

    /// Backfill when the source flags the item as imported or historical,
    /// when it was authored at least one horizon before capture, or when the
    /// capture time is unknown. Everything else is Live.
    pub fn detect(&self, item: &Item) -> Mode {
        if item.source.batch_import || item.source.historical {
            return Mode::Backfill;
        }
        let Some(captured) = item.captured_at else {
            return Mode::Backfill;
        };
        match item.authored_at {
            Some(authored) if authored <= captured - self.horizon => Mode::Backfill,
            _ => Mode::Live,
        }
    }
}

impl Default for ModeDetector {
    fn default() -> Self {
        Self::new(&ModeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::{aged_item, live_item, ItemBuilder};

    #[test]
    fn fresh_item_is_live() {
        assert_eq!(ModeDetector::default().detect(&live_item("a", "x")), Mode::Live);
    }

    #[test]
    fn boundary_age_resolves_to_backfill() {
        let detector = ModeDetector::default();
        assert_eq!(detector.detect(&aged_item("a", "x", 14)), Mode::Backfill);
        assert_eq!(detector.detect(&aged_item("b", "x", 13)), Mode::Live);
    }

    #[test]
    fn source_flags_force_backfill() {
        let detector = ModeDetector::default();
        let imported = ItemBuilder::new("a", "x").batch_import().build();
        let historical = ItemBuilder::new("b", "x").historical().build();
        assert_eq!(detector.detect(&imported), Mode::Backfill);
        assert_eq!(detector.detect(&historical), Mode::Backfill);
    }

    #[test]
    fn missing_capture_time_falls_back_to_backfill() {
        let item = ItemBuilder::new("a", "x").no_capture_time().build();
        assert_eq!(ModeDetector::default().detect(&item), Mode::Backfill);
    }

    #[test]
    fn authored_after_capture_is_live() {
        let item = ItemBuilder::new("a", "x").authored_days_before(-3).build();
        assert_eq!(ModeDetector::default().detect(&item), Mode::Live);
    }
}
