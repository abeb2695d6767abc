use crate::errors::TriageResult;
use crate::models::RuleWeight;

/// Durable home of calibrated weights and the calibration checkpoint.
pub trait ICalibrationStore: Send + Sync {
    /// All persisted weight overlays.
    fn load_weights(&self) -> TriageResult<Vec<RuleWeight>>;

    /// Last log sequence number consumed by calibration (0 if never run).
    fn checkpoint(&self) -> TriageResult<u64>;

    /// Write weights and move the checkpoint from `from_checkpoint` to
    /// `to_checkpoint` in one atomic step. Fails with
    /// `CalibrationError::Stale`, writing nothing, when the stored checkpoint
    /// is no longer `from_checkpoint`.
    fn commit_calibration(
        &self,
        weights: &[RuleWeight],
        from_checkpoint: u64,
        to_checkpoint: u64,
    ) -> TriageResult<()>;

    /// Operator action: drop calibrated overlays (all rules when `rule_id` is None).
    /// Returns the number of overlays removed.
    fn reset_weights(&self, rule_id: Option<&str>) -> TriageResult<usize>;
}
