use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::correction::CorrectionEvent;
use super::decision::{Action, Decision, PlannedOutcome};

/// Final state of an execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Succeeded,
    /// Transient failures exhausted the retry budget; retried later.
    Deferred,
    /// The executor rejected the request outright.
    Rejected,
}

/// Execution result for a logged decision, appended as its own entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub item_id: String,
    pub decision_seq: u64,
    pub action: Action,
    pub destination: Option<String>,
    pub status: ExecutionStatus,
    pub attempts: u32,
    pub detail: String,
    pub executed_at: DateTime<Utc>,
}

/// Anything that can be appended to the decision log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogRecord {
    Decision(Decision),
    Execution(ExecutionRecord),
    Correction(CorrectionEvent),
}

impl LogRecord {
    pub fn item_id(&self) -> &str {
        match self {
            Self::Decision(d) => &d.item_id,
            Self::Execution(e) => &e.item_id,
            Self::Correction(c) => &c.item_id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decision(_) => "decision",
            Self::Execution(_) => "execution",
            Self::Correction(_) => "correction",
        }
    }

    pub fn as_decision(&self) -> Option<&Decision> {
        match self {
            Self::Decision(d) => Some(d),
            _ => None,
        }
    }

    /// Outcome metadata stored next to decisions.
    pub fn planned_outcome(&self) -> Option<PlannedOutcome> {
        self.as_decision().map(Decision::planned_outcome)
    }
}

/// A committed, immutable log entry. `seq` is the log's logical clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub seq: u64,
    pub record: LogRecord,
    pub outcome: Option<PlannedOutcome>,
    pub appended_at: DateTime<Utc>,
}
