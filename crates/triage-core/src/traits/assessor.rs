use crate::models::{Assessment, AssessorOutcome, Item, Mode};

/// One independent evaluator.
///
/// Implementations must be total: well-formed input always yields an outcome,
/// malformed input yields a zero-confidence assessment describing the problem.
pub trait IAssessor: Send + Sync {
    /// Stable name, recorded in the decision log.
    fn name(&self) -> &str;

    /// Whether a decision in `mode` must contain an assessment from this assessor.
    fn required_in(&self, mode: Mode) -> bool;

    /// Evaluate an item under a mode.
    fn evaluate(&self, item: &Item, mode: Mode) -> AssessorOutcome;

    /// Zero-confidence assessment of this assessor's kind, used on timeout or failure.
    fn fallback(&self, mode: Mode, rationale: &str) -> Assessment;
}
