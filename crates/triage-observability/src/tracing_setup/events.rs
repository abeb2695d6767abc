//! Structured log events for key operations.
//!
//! Each function emits a `tracing` event with an `event` field naming it.

use triage_core::models::{Action, ErrorRecord};

/// A decision reached the log.
pub fn decision_committed(item_id: &str, seq: u64, action: Action, confidence: f64) {
    tracing::info!(
        event = "decision_committed",
        item_id = %item_id,
        seq = seq,
        action = %action,
        confidence = confidence,
        "decision committed"
    );
}

pub fn assessor_timed_out(item_id: &str, assessor: &str, timeout_ms: u64) {
    tracing::warn!(
        event = "assessor_timed_out",
        item_id = %item_id,
        assessor = %assessor,
        timeout_ms = timeout_ms,
        "assessor timed out, fallback used"
    );
}

/// An item left the batch without a logged decision.
pub fn item_errored(item_id: &str, reason: &str) {
    tracing::warn!(
        event = "item_errored",
        item_id = %item_id,
        reason = %reason,
        "item not decided"
    );
}

pub fn calibration_completed(from: u64, to: u64, rules_updated: usize, version: Option<u64>) {
    tracing::info!(
        event = "calibration_completed",
        from_checkpoint = from,
        to_checkpoint = to,
        rules_updated = rules_updated,
        rule_set_version = ?version,
        "calibration completed"
    );
}

pub fn rules_reloaded(version: u64, rule_count: usize, document_hash: &str) {
    tracing::info!(
        event = "rules_reloaded",
        version = version,
        rule_count = rule_count,
        document_hash = %document_hash,
        "rule table reloaded"
    );
}

/// An error record was persisted to the error stream.
pub fn error_recorded(record: &ErrorRecord) {
    tracing::warn!(
        event = "error_recorded",
        kind = record.kind.as_str(),
        item_id = ?record.item_id,
        context = %record.context,
        "error recorded"
    );
}

/// The error sink refused a record. Carries every field so nothing is lost.
pub fn error_record_unpersisted(record: &ErrorRecord, sink_error: &str) {
    tracing::error!(
        event = "error_record_unpersisted",
        kind = record.kind.as_str(),
        item_id = ?record.item_id,
        context = %record.context,
        timestamp = %record.timestamp.to_rfc3339(),
        sink_error = %sink_error,
        "error record could not be persisted"
    );
}
