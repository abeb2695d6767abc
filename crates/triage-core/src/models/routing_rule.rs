use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which executor handles a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationKind {
    KnowledgeBase,
    Archive,
    IssueTracker,
    Calendar,
    ReviewQueue,
}

impl DestinationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::KnowledgeBase => "knowledge_base",
            Self::Archive => "archive",
            Self::IssueTracker => "issue_tracker",
            Self::Calendar => "calendar",
            Self::ReviewQueue => "review_queue",
        }
    }
}

impl std::fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Textual matcher for a rule: any keyword or the pattern matching is a hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleMatcher {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub pattern: Option<String>,
}

/// Weighted topic-to-destination mapping.
///
/// Weights are mutated only by calibration, never by assessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRule {
    pub id: String,
    pub destination: String,
    pub destination_kind: DestinationKind,
    pub matcher: RuleMatcher,
    /// Always within [0, 1].
    pub weight: f64,
    /// Total number of decisions that reinforced this rule.
    pub reinforcement_count: u64,
    /// Log sequence numbers of the most recent reinforcing decisions.
    pub provenance: Vec<u64>,
}

/// Calibrated weight overlay persisted by the calibrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleWeight {
    pub rule_id: String,
    pub weight: f64,
    pub reinforcement_count: u64,
    pub provenance: Vec<u64>,
    pub updated_at: DateTime<Utc>,
}

impl RuleWeight {
    /// Seed an overlay from a rule's current state.
    pub fn from_rule(rule: &RoutingRule) -> Self {
        Self {
            rule_id: rule.id.clone(),
            weight: rule.weight,
            reinforcement_count: rule.reinforcement_count,
            provenance: rule.provenance.clone(),
            updated_at: Utc::now(),
        }
    }
}
