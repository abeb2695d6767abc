//! Decision log: ordering, atomic append, immutability, per-item lookups.

use chrono::Utc;

use test_fixtures::decision;
use triage_core::models::{
    Action, CorrectionEvent, CorrectionKind, ExecutionRecord, ExecutionStatus, LogRecord,
    PlannedOutcome,
};
use triage_core::traits::IDecisionLog;
use triage_storage::StorageEngine;

fn make_engine() -> StorageEngine {
    StorageEngine::open_in_memory().expect("open in-memory storage")
}

fn execution(item_id: &str, seq: u64, status: ExecutionStatus) -> LogRecord {
    LogRecord::Execution(ExecutionRecord {
        item_id: item_id.into(),
        decision_seq: seq,
        action: Action::Store,
        destination: Some("kb/dev/reference".into()),
        status,
        attempts: 1,
        detail: String::new(),
        executed_at: Utc::now(),
    })
}

// ── Ordering ──

#[test]
fn empty_log_has_seq_zero() {
    let engine = make_engine();
    assert_eq!(engine.last_seq().unwrap(), 0);
    assert!(engine.read(0, 100).unwrap().is_empty());
}

#[test]
fn appends_get_increasing_sequence_numbers() {
    let engine = make_engine();
    let mut seqs = Vec::new();
    for i in 0..5 {
        let d = decision(&format!("item-{i}"), Action::Store, "dev-reference", "kb/dev/reference");
        seqs.push(engine.append(&LogRecord::Decision(d)).unwrap());
    }
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(engine.last_seq().unwrap(), *seqs.last().unwrap());
}

#[test]
fn read_from_respects_start_and_limit() {
    let engine = make_engine();
    for i in 0..6 {
        let d = decision(&format!("item-{i}"), Action::Surface, "ideas", "kb/ideas");
        engine.append(&LogRecord::Decision(d)).unwrap();
    }
    let page = engine.read(3, 2).unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].seq, 3);
    assert_eq!(page[1].seq, 4);
}

#[test]
fn reads_past_the_largest_rowid_are_empty() {
    let engine = make_engine();
    let d = decision("a", Action::Surface, "ideas", "kb/ideas");
    engine.append(&LogRecord::Decision(d)).unwrap();

    assert!(engine.read(u64::MAX, 10).unwrap().is_empty());
    assert!(engine.read(i64::MAX as u64 + 1, 10).unwrap().is_empty());
    assert!(engine.decision_at(u64::MAX).unwrap().is_none());
    assert_eq!(engine.read(1, usize::MAX).unwrap().len(), 1);
}

#[test]
fn repeated_reads_are_identical() {
    let engine = make_engine();
    for i in 0..4 {
        let d = decision(&format!("item-{i}"), Action::Store, "finance", "archive/finance");
        engine.append(&LogRecord::Decision(d)).unwrap();
    }
    let first = engine.read(0, 100).unwrap();
    let second = engine.read(0, 100).unwrap();
    assert_eq!(first, second);
}

// ── Outcome metadata ──

#[test]
fn decision_entries_carry_planned_outcome() {
    let engine = make_engine();
    let d = decision("a", Action::Store, "dev-reference", "kb/dev/reference");
    engine.append(&LogRecord::Decision(d)).unwrap();
    let d = decision("b", Action::Discard, "ideas", "kb/ideas");
    engine.append(&LogRecord::Decision(d)).unwrap();

    let entries = engine.read(0, 10).unwrap();
    assert_eq!(
        entries[0].outcome,
        Some(PlannedOutcome::DestinationWritten {
            destination: "kb/dev/reference".into()
        })
    );
    assert_eq!(entries[1].outcome, Some(PlannedOutcome::Discarded));
}

#[test]
fn execution_and_correction_entries_have_no_planned_outcome() {
    let engine = make_engine();
    let d = decision("a", Action::Store, "dev-reference", "kb/dev/reference");
    let seq = engine.append(&LogRecord::Decision(d.clone())).unwrap();
    engine
        .append(&execution("a", seq, ExecutionStatus::Succeeded))
        .unwrap();
    engine
        .append(&LogRecord::Correction(CorrectionEvent::for_decision(
            seq,
            &d,
            CorrectionKind::Confirmed,
        )))
        .unwrap();

    let entries = engine.read(0, 10).unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries[1].outcome.is_none());
    assert!(entries[2].outcome.is_none());
    assert_eq!(entries[2].record.kind(), "correction");
}

// ── Immutability ──

#[test]
fn update_and_delete_are_rejected_by_the_database() {
    let engine = make_engine();
    let d = decision("a", Action::Store, "dev-reference", "kb/dev/reference");
    engine.append(&LogRecord::Decision(d)).unwrap();

    let update = engine.pool().writer.with_conn_sync(|conn| {
        conn.execute("UPDATE decision_log SET action = 'discard'", [])
            .map_err(|e| triage_core::TriageError::ConfigError(e.to_string()))
    });
    assert!(update.is_err());

    let delete = engine.pool().writer.with_conn_sync(|conn| {
        conn.execute("DELETE FROM decision_log", [])
            .map_err(|e| triage_core::TriageError::ConfigError(e.to_string()))
    });
    assert!(delete.is_err());
    assert_eq!(engine.read(0, 10).unwrap().len(), 1);
}

// ── Lookups ──

#[test]
fn latest_decision_for_returns_most_recent() {
    let engine = make_engine();
    let first = decision("a", Action::Surface, "ideas", "kb/ideas");
    engine.append(&LogRecord::Decision(first)).unwrap();
    let other = decision("b", Action::Store, "finance", "archive/finance");
    engine.append(&LogRecord::Decision(other)).unwrap();
    let second = decision("a", Action::Store, "dev-reference", "kb/dev/reference");
    let seq = engine.append(&LogRecord::Decision(second)).unwrap();

    let (found_seq, found) = engine.latest_decision_for("a").unwrap().unwrap();
    assert_eq!(found_seq, seq);
    assert_eq!(found.action, Action::Store);
    assert!(engine.latest_decision_for("missing").unwrap().is_none());
}

#[test]
fn decision_at_ignores_non_decision_entries() {
    let engine = make_engine();
    let d = decision("a", Action::Store, "dev-reference", "kb/dev/reference");
    let seq = engine.append(&LogRecord::Decision(d)).unwrap();
    let exec_seq = engine
        .append(&execution("a", seq, ExecutionStatus::Succeeded))
        .unwrap();
    assert!(engine.decision_at(seq).unwrap().is_some());
    assert!(engine.decision_at(exec_seq).unwrap().is_none());
}

#[test]
fn pending_executions_tracks_missing_and_deferred() {
    let engine = make_engine();
    // Store with no execution entry yet.
    let a = engine
        .append(&LogRecord::Decision(decision("a", Action::Store, "dev-reference", "kb/dev")))
        .unwrap();
    // Store executed successfully.
    let b = engine
        .append(&LogRecord::Decision(decision("b", Action::Store, "finance", "archive/finance")))
        .unwrap();
    engine.append(&execution("b", b, ExecutionStatus::Succeeded)).unwrap();
    // Store deferred.
    let c = engine
        .append(&LogRecord::Decision(decision("c", Action::Store, "mail", "archive/mail")))
        .unwrap();
    engine.append(&execution("c", c, ExecutionStatus::Deferred)).unwrap();
    // Store rejected.
    let d = engine
        .append(&LogRecord::Decision(decision("d", Action::Store, "mail", "archive/mail")))
        .unwrap();
    engine.append(&execution("d", d, ExecutionStatus::Rejected)).unwrap();
    // Surface without an executor.
    engine
        .append(&LogRecord::Decision(decision("e", Action::Surface, "ideas", "kb/ideas")))
        .unwrap();

    let pending: Vec<u64> = engine
        .pending_executions(10)
        .unwrap()
        .into_iter()
        .map(|(seq, _)| seq)
        .collect();
    assert_eq!(pending, vec![a, c]);
}

#[test]
fn entries_for_item_and_counts() {
    let engine = make_engine();
    let seq = engine
        .append(&LogRecord::Decision(decision("a", Action::Store, "dev-reference", "kb/dev")))
        .unwrap();
    engine.append(&execution("a", seq, ExecutionStatus::Succeeded)).unwrap();
    engine
        .append(&LogRecord::Decision(decision("b", Action::Discard, "ideas", "kb/ideas")))
        .unwrap();

    assert_eq!(engine.entries_for_item("a").unwrap().len(), 2);
    let counts = engine.log_counts().unwrap();
    assert_eq!(
        counts,
        vec![("decision".to_string(), 2), ("execution".to_string(), 1)]
    );
}
