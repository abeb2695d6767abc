//! # triage-decision
//!
//! Combines assessments into one action using mode-specific thresholds.
//! Aggregation is pure: same mode, same assessments, same table, same result.

pub mod aggregator;
pub mod signals;
pub mod thresholds;

pub use aggregator::{AggregateOutcome, DecisionAggregator};
pub use signals::Signals;
pub use thresholds::ThresholdTable;
