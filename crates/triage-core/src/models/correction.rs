use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::decision::{Action, Decision};

/// Human feedback on a logged decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CorrectionKind {
    /// The routed destination was right (for a surfaced item: the human stored it there).
    Confirmed,
    /// The human routed elsewhere, or reverted the action.
    Overridden { destination: Option<String> },
}

/// Correction event fed back into calibration.
///
/// Carries the rule and destination of the corrected decision so calibration
/// never has to look behind its window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionEvent {
    pub item_id: String,
    pub corrects_seq: u64,
    pub rule_id: Option<String>,
    pub routed_destination: Option<String>,
    pub original_action: Action,
    pub kind: CorrectionKind,
    pub reported_at: DateTime<Utc>,
}

impl CorrectionEvent {
    pub fn for_decision(seq: u64, decision: &Decision, kind: CorrectionKind) -> Self {
        Self {
            item_id: decision.item_id.clone(),
            corrects_seq: seq,
            rule_id: decision.rule_id.clone(),
            routed_destination: decision.destination.clone(),
            original_action: decision.action,
            kind,
            reported_at: Utc::now(),
        }
    }

    /// An override that names the routed destination is really a confirmation.
    pub fn effective_kind(&self) -> CorrectionKind {
        match &self.kind {
            CorrectionKind::Overridden {
                destination: Some(dest),
            } if Some(dest) == self.routed_destination.as_ref() => CorrectionKind::Confirmed,
            other => other.clone(),
        }
    }
}
