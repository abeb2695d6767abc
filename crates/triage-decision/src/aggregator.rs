//! Decision aggregator: four ordered rules over mode thresholds.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use triage_core::models::{
    Action, Assessment, Decision, DecisionBranch, DestinationKind, Mode, SurfaceTrigger,
};
use triage_core::Confidence;

use crate::signals::Signals;
use crate::thresholds::ThresholdTable;

/// Action plus everything needed to audit why it was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateOutcome {
    pub action: Action,
    /// Maximum confidence among the assessments that determined the branch.
    pub confidence: Confidence,
    pub destination: Option<String>,
    pub destination_kind: Option<DestinationKind>,
    pub rule_id: Option<String>,
    pub branch: DecisionBranch,
}

#[derive(Debug, Clone, Default)]
pub struct DecisionAggregator {
    thresholds: ThresholdTable,
}

impl DecisionAggregator {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Apply, in order:
    ///
    /// 1. excitement at or above `surface_min`, pressing urgency, or routing
    ///    below the mode's floor: Surface;
    /// 2. routing at or above `store_min`: Store;
    /// 3. excitement and urgency strength both at or below `discard_max`: Discard;
    /// 4. otherwise Surface.
    pub fn aggregate(&self, mode: Mode, assessments: &[Assessment]) -> AggregateOutcome {
        let t = self.thresholds.for_mode(mode);
        let signals = Signals::read(assessments);
        let routing = signals.routing_confidence();
        let excitement = signals.excitement();

        let (destination, destination_kind, rule_id) = match signals.destination() {
            Some((dest, kind, rule)) => (Some(dest), kind, rule),
            None => (None, None, None),
        };
        let outcome = |action, confidence, branch| AggregateOutcome {
            action,
            confidence,
            destination: destination.clone(),
            destination_kind,
            rule_id: rule_id.clone(),
            branch,
        };

        // Rule 1
        let mut triggers = Vec::new();
        let mut trigger_confidence = Confidence::ZERO;
        if excitement.value() >= t.surface_min {
            triggers.push(SurfaceTrigger::Excitement);
            trigger_confidence = trigger_confidence.max(excitement);
        }
        if let Some(urgency) = signals.pressing_urgency() {
            triggers.push(SurfaceTrigger::Urgency);
            trigger_confidence = trigger_confidence.max(urgency);
        }
        if routing.value() < t.routing_floor {
            triggers.push(SurfaceTrigger::RoutingUncertain);
            trigger_confidence = trigger_confidence.max(routing);
        }
        if !triggers.is_empty() {
            return outcome(
                Action::Surface,
                trigger_confidence,
                DecisionBranch::Signal { triggers },
            );
        }

        // Rule 2
        if routing.value() >= t.store_min && destination.is_some() {
            return outcome(
                Action::Store,
                routing.max(excitement),
                DecisionBranch::AutoStore,
            );
        }

        // Rule 3
        let urgency = signals.urgency_strength();
        if excitement.value() <= t.discard_max && urgency.value() <= t.discard_max {
            return outcome(Action::Discard, excitement.max(urgency), DecisionBranch::Discard);
        }

        // Rule 4
        let all = assessments
            .iter()
            .fold(Confidence::ZERO, |acc, a| acc.max(a.confidence));
        outcome(Action::Surface, all, DecisionBranch::Ambiguous)
    }

    /// Aggregate and wrap the result as a decision stamped now.
    pub fn decide(
        &self,
        item_id: &str,
        mode: Mode,
        assessments: Vec<Assessment>,
        rule_set_version: u64,
    ) -> Decision {
        let outcome = self.aggregate(mode, &assessments);
        tracing::debug!(
            item_id,
            mode = %mode,
            action = %outcome.action,
            confidence = outcome.confidence.value(),
            "aggregated"
        );
        Decision {
            item_id: item_id.to_string(),
            mode,
            assessments,
            action: outcome.action,
            confidence: outcome.confidence,
            destination: outcome.destination,
            destination_kind: outcome.destination_kind,
            rule_id: outcome.rule_id,
            rule_set_version,
            branch: outcome.branch,
            decided_at: Utc::now(),
        }
    }
}
