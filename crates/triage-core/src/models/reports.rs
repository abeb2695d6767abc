use serde::{Deserialize, Serialize};

/// Counters returned by one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub fetched: usize,
    /// Items fully decided and logged in this run.
    pub decided: usize,
    pub stored: usize,
    pub surfaced: usize,
    pub discarded: usize,
    pub errored: usize,
    /// Items that already had a logged decision; only their tag was advanced.
    pub skipped: usize,
    pub cancelled: usize,
    /// Items found tagged `processing` with no evaluation in flight and
    /// taken over by this run. Included in `fetched`.
    #[serde(default)]
    pub reclaimed: usize,
}

/// Change applied to one rule during calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightDelta {
    pub rule_id: String,
    pub before: f64,
    pub after: f64,
    pub bumps: u32,
    pub decays: u32,
}

impl WeightDelta {
    pub fn delta(&self) -> f64 {
        self.after - self.before
    }
}

/// Result of one calibration run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// Checkpoint the run started from (last consumed seq, 0 if none).
    pub from_checkpoint: u64,
    /// Checkpoint after the run.
    pub to_checkpoint: u64,
    pub entries_scanned: usize,
    pub deltas: Vec<WeightDelta>,
    /// Rule table version published with the new weights.
    pub rule_set_version: Option<u64>,
}
