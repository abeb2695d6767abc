//! # triage-learning
//!
//! Periodic batch calibration of routing weights from the decision log.
//! Never runs inline with per-item decisions.

pub mod engine;
pub mod formula;
pub mod window;

pub use engine::ConfidenceCalibrator;
pub use window::{fold_window, WindowOutcome};
