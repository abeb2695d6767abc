/// Calibration errors. Never fatal to the serving path.
#[derive(Debug, thiserror::Error)]
pub enum CalibrationError {
    #[error("a calibration run is already in progress")]
    AlreadyRunning,

    #[error("weight commit failed: {reason}")]
    CommitFailed { reason: String },

    /// Another calibrator committed since this run read its checkpoint.
    #[error("calibration window already consumed (started at {expected}, store is at {found})")]
    Stale { expected: u64, found: u64 },

    #[error("log window read failed: {reason}")]
    ReadFailed { reason: String },
}
