//! # triage-assessment
//!
//! Mode detection plus the independent assessors. Every assessor is total:
//! well-formed input yields an assessment (or an explicit skip), malformed
//! input yields a zero-confidence assessment naming the problem.

pub mod assessor_set;
pub mod deadline;
pub mod excitement;
pub mod mode_detector;
pub mod routing;
pub mod urgency;

pub use assessor_set::AssessorSet;
pub use excitement::ExcitementAssessor;
pub use mode_detector::ModeDetector;
pub use routing::RoutingAssessor;
pub use urgency::UrgencyAssessor;

use triage_core::models::Item;

/// Problems that leave an assessor nothing to evaluate.
pub(crate) fn malformity(item: &Item) -> Option<String> {
    let blocking: Vec<String> = item
        .validate()
        .into_iter()
        .filter(|p| p.blocks_assessment())
        .map(|p| p.to_string())
        .collect();
    if blocking.is_empty() {
        None
    } else {
        Some(format!("malformed input: {}", blocking.join("; ")))
    }
}
