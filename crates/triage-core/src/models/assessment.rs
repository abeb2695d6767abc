use serde::{Deserialize, Serialize};

use super::mode::Mode;
use super::routing_rule::DestinationKind;
use crate::confidence::Confidence;

/// Urgency classes, most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    Immediate,
    Today,
    ThisWeek,
    Whenever,
}

impl UrgencyLevel {
    /// Higher is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Self::Immediate => 3,
            Self::Today => 2,
            Self::ThisWeek => 1,
            Self::Whenever => 0,
        }
    }

    /// Levels that force an item in front of a human.
    pub fn warrants_surface(self) -> bool {
        matches!(self, Self::Immediate | Self::Today)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Today => "today",
            Self::ThisWeek => "this_week",
            Self::Whenever => "whenever",
        }
    }
}

/// Kind-specific result carried by an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssessmentPayload {
    Routing {
        destination: Option<String>,
        destination_kind: Option<DestinationKind>,
        rule_id: Option<String>,
        /// Number of rules that matched before tie-breaking.
        matched: usize,
    },
    Urgency {
        level: UrgencyLevel,
        /// Signal kinds that fired ("lexicon", "deadline", "action_verb").
        signals: Vec<String>,
    },
    Excitement {
        score: f64,
    },
    Custom {
        data: serde_json::Value,
    },
}

/// Immutable judgment produced by one assessor for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub assessor: String,
    pub mode: Mode,
    pub payload: AssessmentPayload,
    pub confidence: Confidence,
    pub rationale: String,
}

impl Assessment {
    pub fn new(
        assessor: impl Into<String>,
        mode: Mode,
        payload: AssessmentPayload,
        confidence: f64,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            assessor: assessor.into(),
            mode,
            payload,
            confidence: Confidence::new(confidence),
            rationale: rationale.into(),
        }
    }

    /// Rule id carried by a routing assessment.
    pub fn rule_id(&self) -> Option<&str> {
        match &self.payload {
            AssessmentPayload::Routing { rule_id, .. } => rule_id.as_deref(),
            _ => None,
        }
    }

    pub fn is_routing(&self) -> bool {
        matches!(self.payload, AssessmentPayload::Routing { .. })
    }

    pub fn urgency_level(&self) -> Option<UrgencyLevel> {
        match self.payload {
            AssessmentPayload::Urgency { level, .. } => Some(level),
            _ => None,
        }
    }

    pub fn excitement_score(&self) -> Option<f64> {
        match self.payload {
            AssessmentPayload::Excitement { score } => Some(score),
            _ => None,
        }
    }
}

/// Result of running one assessor: an assessment, or an explicit skip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssessorOutcome {
    Assessed(Assessment),
    Skip { assessor: String, reason: String },
}

impl AssessorOutcome {
    pub fn assessment(&self) -> Option<&Assessment> {
        match self {
            Self::Assessed(a) => Some(a),
            Self::Skip { .. } => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip { .. })
    }
}
