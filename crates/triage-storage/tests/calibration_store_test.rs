//! Calibrated weights and the checkpoint: atomic commit, reset, monotonic checkpoint.

use chrono::Utc;

use triage_core::errors::CalibrationError;
use triage_core::models::RuleWeight;
use triage_core::traits::ICalibrationStore;
use triage_core::TriageError;
use triage_storage::StorageEngine;

fn make_engine() -> StorageEngine {
    StorageEngine::open_in_memory().expect("open in-memory storage")
}

fn weight(rule_id: &str, w: f64, provenance: Vec<u64>) -> RuleWeight {
    RuleWeight {
        rule_id: rule_id.into(),
        weight: w,
        reinforcement_count: provenance.len() as u64,
        provenance,
        updated_at: Utc::now(),
    }
}

#[test]
fn fresh_store_is_empty() {
    let engine = make_engine();
    assert_eq!(engine.checkpoint().unwrap(), 0);
    assert!(engine.load_weights().unwrap().is_empty());
}

#[test]
fn commit_writes_weights_and_checkpoint_together() {
    let engine = make_engine();
    engine
        .commit_calibration(
            &[weight("dev-reference", 0.91, vec![1, 4]), weight("ideas", 0.45, vec![])],
            0,
            7,
        )
        .unwrap();

    assert_eq!(engine.checkpoint().unwrap(), 7);
    let weights = engine.load_weights().unwrap();
    assert_eq!(weights.len(), 2);
    assert_eq!(weights[0].rule_id, "dev-reference");
    assert_eq!(weights[0].provenance, vec![1, 4]);
    assert_eq!(weights[0].reinforcement_count, 2);
}

#[test]
fn later_commit_overwrites_weight() {
    let engine = make_engine();
    engine
        .commit_calibration(&[weight("ideas", 0.5, vec![])], 0, 3)
        .unwrap();
    engine
        .commit_calibration(&[weight("ideas", 0.55, vec![5])], 3, 6)
        .unwrap();
    let weights = engine.load_weights().unwrap();
    assert_eq!(weights.len(), 1);
    assert!((weights[0].weight - 0.55).abs() < 1e-12);
}

#[test]
fn out_of_range_weight_rolls_back_everything() {
    let engine = make_engine();
    let result = engine.commit_calibration(
        &[weight("good", 0.5, vec![]), weight("bad", 1.5, vec![])],
        0,
        9,
    );
    assert!(result.is_err());
    assert_eq!(engine.checkpoint().unwrap(), 0);
    assert!(engine.load_weights().unwrap().is_empty());
}

#[test]
fn checkpoint_never_moves_backwards() {
    let engine = make_engine();
    engine.commit_calibration(&[], 0, 10).unwrap();
    let err = engine.commit_calibration(&[], 10, 4).unwrap_err();
    assert!(matches!(
        err,
        TriageError::CalibrationError(CalibrationError::CommitFailed { .. })
    ));
    assert_eq!(engine.checkpoint().unwrap(), 10);
}

#[test]
fn commit_from_a_consumed_checkpoint_is_stale() {
    let engine = make_engine();
    engine
        .commit_calibration(&[weight("ideas", 0.55, vec![1])], 0, 1)
        .unwrap();

    // A second run that also started from 0 must not apply its window again.
    let err = engine
        .commit_calibration(&[weight("ideas", 0.55, vec![1])], 0, 1)
        .unwrap_err();
    assert!(matches!(
        err,
        TriageError::CalibrationError(CalibrationError::Stale {
            expected: 0,
            found: 1
        })
    ));
    let weights = engine.load_weights().unwrap();
    assert_eq!(weights[0].reinforcement_count, 1);
    assert_eq!(engine.checkpoint().unwrap(), 1);
}

#[test]
fn reset_removes_one_or_all_overlays() {
    let engine = make_engine();
    engine
        .commit_calibration(
            &[weight("a", 0.2, vec![]), weight("b", 0.3, vec![]), weight("c", 0.4, vec![])],
            0,
            2,
        )
        .unwrap();
    assert_eq!(engine.reset_weights(Some("b")).unwrap(), 1);
    assert_eq!(engine.reset_weights(Some("missing")).unwrap(), 0);
    assert_eq!(engine.load_weights().unwrap().len(), 2);
    assert_eq!(engine.reset_weights(None).unwrap(), 2);
    assert!(engine.load_weights().unwrap().is_empty());
    // Reset leaves the checkpoint alone.
    assert_eq!(engine.checkpoint().unwrap(), 2);
}
