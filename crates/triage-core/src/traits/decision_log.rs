use crate::errors::TriageResult;
use crate::models::{Decision, DecisionLogEntry, LogRecord};

/// Append-only, totally ordered decision log.
pub trait IDecisionLog: Send + Sync {
    /// Atomically append a record. Returns its sequence number once durable.
    fn append(&self, record: &LogRecord) -> TriageResult<u64>;

    /// Read up to `limit` entries with `seq >= from_seq`, in sequence order.
    fn read(&self, from_seq: u64, limit: usize) -> TriageResult<Vec<DecisionLogEntry>>;

    /// Highest committed sequence number (0 when empty).
    fn last_seq(&self) -> TriageResult<u64>;

    /// Most recent decision logged for an item, with its sequence number.
    fn latest_decision_for(&self, item_id: &str) -> TriageResult<Option<(u64, Decision)>>;
}
