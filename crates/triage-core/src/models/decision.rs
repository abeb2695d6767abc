use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::assessment::Assessment;
use super::mode::Mode;
use super::routing_rule::DestinationKind;
use crate::confidence::Confidence;

/// What happens to an item once decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Auto-route silently to the routing destination.
    Store,
    /// Present to a human.
    Surface,
    /// Drop; the decision is still logged.
    Discard,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Surface => "surface",
            Self::Discard => "discard",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which signal pushed an item to the surface branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceTrigger {
    Excitement,
    Urgency,
    RoutingUncertain,
}

/// Aggregation rule that produced the action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "branch", rename_all = "snake_case")]
pub enum DecisionBranch {
    Signal { triggers: Vec<SurfaceTrigger> },
    AutoStore,
    Discard,
    Ambiguous,
}

/// Planned outcome recorded alongside the decision at append time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlannedOutcome {
    DestinationWritten { destination: String },
    Surfaced,
    Discarded,
}

/// The aggregated verdict for one item. Immutable once logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub item_id: String,
    pub mode: Mode,
    /// Every assessment consumed, in assessor registration order.
    pub assessments: Vec<Assessment>,
    pub action: Action,
    pub confidence: Confidence,
    /// Destination chosen by routing (the suggestion, for surfaced items).
    pub destination: Option<String>,
    pub destination_kind: Option<DestinationKind>,
    /// Rule that routing selected, used by calibration.
    pub rule_id: Option<String>,
    /// Version of the rule table the decision was made against.
    pub rule_set_version: u64,
    pub branch: DecisionBranch,
    pub decided_at: DateTime<Utc>,
}

impl Decision {
    pub fn planned_outcome(&self) -> PlannedOutcome {
        match self.action {
            Action::Store => PlannedOutcome::DestinationWritten {
                destination: self.destination.clone().unwrap_or_default(),
            },
            Action::Surface => PlannedOutcome::Surfaced,
            Action::Discard => PlannedOutcome::Discarded,
        }
    }

    pub fn assessment(&self, assessor: &str) -> Option<&Assessment> {
        self.assessments.iter().find(|a| a.assessor == assessor)
    }
}
