//! File-backed storage: data survives reopen, reads go through the read pool,
//! error records persist.

use test_fixtures::decision;
use triage_core::models::{Action, ErrorKind, ErrorRecord, LogRecord};
use triage_core::traits::{IDecisionLog, IErrorSink};
use triage_storage::migrations::LATEST_VERSION;
use triage_storage::pool::pragmas::verify_wal_mode;
use triage_storage::StorageEngine;

#[test]
fn log_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triage.db");

    {
        let engine = StorageEngine::open(&path).unwrap();
        for i in 0..3 {
            let d = decision(&format!("item-{i}"), Action::Store, "dev-reference", "kb/dev");
            engine.append(&LogRecord::Decision(d)).unwrap();
        }
    }

    let engine = StorageEngine::open(&path).unwrap();
    assert_eq!(engine.last_seq().unwrap(), 3);
    let entries = engine.read(0, 10).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].record.item_id(), "item-2");
    assert_eq!(engine.schema_version().unwrap(), LATEST_VERSION);
}

#[test]
fn file_backed_engine_uses_wal_and_read_pool() {
    let dir = tempfile::tempdir().unwrap();
    let engine = StorageEngine::open(&dir.path().join("wal.db")).unwrap();
    assert!(engine.pool().readers.is_some());
    let wal = engine
        .pool()
        .writer
        .with_conn_sync(verify_wal_mode)
        .unwrap();
    assert!(wal);
}

#[test]
fn error_records_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let engine = StorageEngine::open(&dir.path().join("errors.db")).unwrap();

    engine
        .record(&ErrorRecord::new(ErrorKind::AssessorTimeout, Some("item-1"), "routing"))
        .unwrap();
    engine
        .record(&ErrorRecord::new(ErrorKind::RuleParse, None, "bad regex"))
        .unwrap();

    let recent = engine.recent_errors(10).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].kind, ErrorKind::RuleParse);
    assert_eq!(recent[0].item_id, None);
    assert_eq!(recent[1].item_id.as_deref(), Some("item-1"));
    assert_eq!(engine.error_count(ErrorKind::AssessorTimeout).unwrap(), 1);
    assert_eq!(engine.error_count(ErrorKind::LogWriteFailure).unwrap(), 0);
}

#[test]
fn migrations_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("m.db");
    drop(StorageEngine::open(&path).unwrap());
    let engine = StorageEngine::open(&path).unwrap();
    let applied = engine
        .pool()
        .writer
        .with_conn_sync(triage_storage::migrations::run_migrations)
        .unwrap();
    assert_eq!(applied, 0);
}
