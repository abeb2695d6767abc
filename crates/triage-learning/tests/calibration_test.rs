//! Calibration runs against the SQLite store and the sample rule document.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};

use test_fixtures::builders::decision;
use test_fixtures::SAMPLE_RULES;
use triage_core::config::CalibrationConfig;
use triage_core::errors::{CalibrationError, StorageError, TriageError, TriageResult};
use triage_core::models::{
    Action, CorrectionEvent, CorrectionKind, Decision, DecisionLogEntry, LogRecord, RuleWeight,
};
use triage_core::traits::{ICalibrationStore, IDecisionLog};
use triage_learning::ConfidenceCalibrator;
use triage_rules::RuleStore;
use triage_storage::StorageEngine;

const ALPHA: f64 = 0.1;

fn setup() -> (Arc<StorageEngine>, RuleStore, ConfidenceCalibrator) {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let rules = RuleStore::from_document(SAMPLE_RULES).unwrap();
    let calibrator = calibrator_over(engine.clone(), engine.clone());
    (engine, rules, calibrator)
}

fn calibrator_over(
    log: Arc<dyn IDecisionLog>,
    store: Arc<dyn ICalibrationStore>,
) -> ConfidenceCalibrator {
    ConfidenceCalibrator::new(
        log,
        store,
        CalibrationConfig {
            alpha: ALPHA,
            max_window: 1_000,
        },
        4,
    )
}

fn store_decision(log: &dyn IDecisionLog, item: &str, rule: &str) -> (u64, Decision) {
    let d = decision(item, Action::Store, rule, "kb/x");
    let seq = log.append(&LogRecord::Decision(d.clone())).unwrap();
    (seq, d)
}

fn weight_of(rules: &RuleStore, id: &str) -> f64 {
    rules.snapshot().unwrap().rule(id).unwrap().rule.weight
}

#[test]
fn empty_log_changes_nothing() {
    let (engine, rules, calibrator) = setup();
    let report = calibrator.recalibrate(&rules).unwrap();
    assert_eq!(report.entries_scanned, 0);
    assert!(report.deltas.is_empty());
    assert_eq!(report.rule_set_version, None);
    assert_eq!(engine.checkpoint().unwrap(), 0);
    assert_eq!(rules.version().unwrap(), 1);
}

#[test]
fn store_decisions_reinforce_their_rule() {
    let (engine, rules, calibrator) = setup();
    let (s1, _) = store_decision(engine.as_ref(), "a", "ideas");
    let (s2, _) = store_decision(engine.as_ref(), "b", "ideas");

    let report = calibrator.recalibrate(&rules).unwrap();
    assert_eq!(report.to_checkpoint, s2);
    assert_eq!(report.deltas.len(), 1);
    let delta = &report.deltas[0];
    assert_eq!(delta.rule_id, "ideas");
    assert_eq!(delta.bumps, 2);
    // 0.5 -> 0.55 -> 0.595
    assert!((delta.after - 0.595).abs() < 1e-9);
    assert!((weight_of(&rules, "ideas") - 0.595).abs() < 1e-9);
    assert_eq!(report.rule_set_version, Some(rules.version().unwrap()));

    let persisted = engine.load_weights().unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].reinforcement_count, 2);
    assert_eq!(persisted[0].provenance, vec![s1, s2]);
}

#[test]
fn second_run_without_new_entries_is_a_no_op() {
    let (engine, rules, calibrator) = setup();
    store_decision(engine.as_ref(), "a", "mail");
    calibrator.recalibrate(&rules).unwrap();
    let weights = engine.load_weights().unwrap();
    let version = rules.version().unwrap();

    let again = calibrator.recalibrate(&rules).unwrap();
    assert_eq!(again.entries_scanned, 0);
    assert_eq!(engine.load_weights().unwrap(), weights);
    assert_eq!(rules.version().unwrap(), version);
}

#[test]
fn overrides_decay_and_confirmations_of_surfaced_items_reinforce() {
    let (engine, rules, calibrator) = setup();
    let (seq, stored) = store_decision(engine.as_ref(), "a", "finance");
    let surfaced = decision("b", Action::Surface, "mail", "archive/mail");
    let surfaced_seq = engine
        .append(&LogRecord::Decision(surfaced.clone()))
        .unwrap();

    engine
        .append(&LogRecord::Correction(CorrectionEvent::for_decision(
            seq,
            &stored,
            CorrectionKind::Overridden {
                destination: Some("kb/ideas".into()),
            },
        )))
        .unwrap();
    engine
        .append(&LogRecord::Correction(CorrectionEvent::for_decision(
            surfaced_seq,
            &surfaced,
            CorrectionKind::Confirmed,
        )))
        .unwrap();

    let report = calibrator.recalibrate(&rules).unwrap();
    let finance = report.deltas.iter().find(|d| d.rule_id == "finance").unwrap();
    assert_eq!((finance.bumps, finance.decays), (1, 1));
    // bump then decay: (0.8 + 0.02) * 0.9
    assert!((finance.after - 0.738).abs() < 1e-9);

    let mail = report.deltas.iter().find(|d| d.rule_id == "mail").unwrap();
    assert_eq!((mail.bumps, mail.decays), (1, 0));
    assert!((mail.after - 0.73).abs() < 1e-9);
}

#[test]
fn confirming_a_stored_item_is_not_counted_twice() {
    let (engine, rules, calibrator) = setup();
    let (seq, stored) = store_decision(engine.as_ref(), "a", "ideas");
    engine
        .append(&LogRecord::Correction(CorrectionEvent::for_decision(
            seq,
            &stored,
            CorrectionKind::Confirmed,
        )))
        .unwrap();
    let report = calibrator.recalibrate(&rules).unwrap();
    assert_eq!(report.deltas[0].bumps, 1);
}

#[test]
fn order_of_reinforcement_and_decay_matters() {
    let run = |decay_first: bool| {
        let (engine, rules, calibrator) = setup();
        let stored = decision("a", Action::Store, "ideas", "kb/ideas");
        let overridden = CorrectionEvent::for_decision(
            1,
            &stored,
            CorrectionKind::Overridden { destination: None },
        );
        if decay_first {
            engine.append(&LogRecord::Correction(overridden)).unwrap();
            engine.append(&LogRecord::Decision(stored)).unwrap();
        } else {
            engine.append(&LogRecord::Decision(stored)).unwrap();
            engine.append(&LogRecord::Correction(overridden)).unwrap();
        }
        calibrator.recalibrate(&rules).unwrap();
        weight_of(&rules, "ideas")
    };
    let bump_then_decay = run(false);
    let decay_then_bump = run(true);
    assert!((bump_then_decay - decay_then_bump + ALPHA * ALPHA).abs() < 1e-9);
}

#[test]
fn split_windows_match_one_combined_window() {
    let fill = |engine: &StorageEngine, range: std::ops::Range<usize>| {
        for i in range {
            let rule = if i % 3 == 0 { "mail" } else { "ideas" };
            let (seq, d) = store_decision(engine, &format!("item-{i}"), rule);
            if i % 4 == 0 {
                engine
                    .append(&LogRecord::Correction(CorrectionEvent::for_decision(
                        seq,
                        &d,
                        CorrectionKind::Overridden { destination: None },
                    )))
                    .unwrap();
            }
        }
    };

    let (split_engine, split_rules, split_cal) = setup();
    fill(split_engine.as_ref(), 0..5);
    let first = split_cal.recalibrate(&split_rules).unwrap();
    fill(split_engine.as_ref(), 5..12);
    let second = split_cal.recalibrate(&split_rules).unwrap();
    assert_eq!(second.from_checkpoint, first.to_checkpoint);

    let (one_engine, one_rules, one_cal) = setup();
    fill(one_engine.as_ref(), 0..12);
    let combined = one_cal.recalibrate(&one_rules).unwrap();

    for id in ["mail", "ideas"] {
        assert!((weight_of(&split_rules, id) - weight_of(&one_rules, id)).abs() < 1e-9);
        let net = |r: &triage_core::models::CalibrationReport| {
            r.deltas
                .iter()
                .find(|d| d.rule_id == id)
                .map(|d| d.delta())
                .unwrap_or(0.0)
        };
        let summed = net(&first) + net(&second);
        assert!((summed - net(&combined)).abs() < 1e-9, "{id}");
    }
    assert_eq!(split_engine.load_weights().unwrap().len(), one_engine.load_weights().unwrap().len());
}

#[test]
fn window_is_bounded_by_max_window() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let rules = RuleStore::from_document(SAMPLE_RULES).unwrap();
    let calibrator = ConfidenceCalibrator::new(
        engine.clone(),
        engine.clone(),
        CalibrationConfig {
            alpha: ALPHA,
            max_window: 2,
        },
        4,
    );
    for i in 0..5 {
        store_decision(engine.as_ref(), &format!("i{i}"), "ideas");
    }
    assert_eq!(calibrator.recalibrate(&rules).unwrap().to_checkpoint, 2);
    assert_eq!(calibrator.recalibrate(&rules).unwrap().to_checkpoint, 4);
    assert_eq!(calibrator.recalibrate(&rules).unwrap().to_checkpoint, 5);
}

#[test]
fn provenance_is_capped_to_the_most_recent() {
    let (engine, rules, calibrator) = setup();
    let seqs: Vec<u64> = (0..6)
        .map(|i| store_decision(engine.as_ref(), &format!("i{i}"), "ideas").0)
        .collect();
    calibrator.recalibrate(&rules).unwrap();
    let w = &engine.load_weights().unwrap()[0];
    assert_eq!(w.reinforcement_count, 6);
    assert_eq!(w.provenance, seqs[2..].to_vec());
}

#[test]
fn entries_for_unknown_rules_are_skipped() {
    let (engine, rules, calibrator) = setup();
    store_decision(engine.as_ref(), "a", "retired-rule");
    let report = calibrator.recalibrate(&rules).unwrap();
    assert!(report.deltas.is_empty());
    assert_eq!(report.to_checkpoint, 1);
}

struct FailingCommit {
    inner: Arc<StorageEngine>,
}

impl ICalibrationStore for FailingCommit {
    fn load_weights(&self) -> TriageResult<Vec<RuleWeight>> {
        self.inner.load_weights()
    }
    fn checkpoint(&self) -> TriageResult<u64> {
        self.inner.checkpoint()
    }
    fn commit_calibration(&self, _: &[RuleWeight], _: u64, _: u64) -> TriageResult<()> {
        Err(CalibrationError::CommitFailed {
            reason: "disk full".into(),
        }
        .into())
    }
    fn reset_weights(&self, rule_id: Option<&str>) -> TriageResult<usize> {
        self.inner.reset_weights(rule_id)
    }
}

#[test]
fn failed_commit_leaves_weights_and_checkpoint_untouched() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let rules = RuleStore::from_document(SAMPLE_RULES).unwrap();
    store_decision(engine.as_ref(), "a", "ideas");
    let calibrator = calibrator_over(
        engine.clone(),
        Arc::new(FailingCommit {
            inner: engine.clone(),
        }),
    );

    let err = calibrator.recalibrate(&rules).unwrap_err();
    assert!(matches!(
        err,
        TriageError::CalibrationError(CalibrationError::CommitFailed { .. })
    ));
    assert_eq!(engine.checkpoint().unwrap(), 0);
    assert!(engine.load_weights().unwrap().is_empty());
    assert_eq!(rules.version().unwrap(), 1);
    assert!(!calibrator.is_running());

    // The same window is picked up by a healthy calibrator.
    let healthy = calibrator_over(engine.clone(), engine.clone());
    assert_eq!(healthy.recalibrate(&rules).unwrap().entries_scanned, 1);
}

struct UnreadableLog;

impl IDecisionLog for UnreadableLog {
    fn append(&self, _: &LogRecord) -> TriageResult<u64> {
        Ok(1)
    }
    fn read(&self, _: u64, _: usize) -> TriageResult<Vec<DecisionLogEntry>> {
        Err(StorageError::CorruptEntry {
            seq: 1,
            reason: "truncated".into(),
        }
        .into())
    }
    fn last_seq(&self) -> TriageResult<u64> {
        Ok(1)
    }
    fn latest_decision_for(&self, _: &str) -> TriageResult<Option<(u64, Decision)>> {
        Ok(None)
    }
}

#[test]
fn unreadable_window_reports_read_failure() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let rules = RuleStore::from_document(SAMPLE_RULES).unwrap();
    let calibrator = calibrator_over(Arc::new(UnreadableLog), engine);
    assert!(matches!(
        calibrator.recalibrate(&rules),
        Err(TriageError::CalibrationError(CalibrationError::ReadFailed { .. }))
    ));
}

/// Blocks inside `checkpoint` until released, holding the run open.
struct GatedStore {
    inner: Arc<StorageEngine>,
    entered: Arc<AtomicBool>,
    release: Arc<AtomicBool>,
}

impl ICalibrationStore for GatedStore {
    fn load_weights(&self) -> TriageResult<Vec<RuleWeight>> {
        self.inner.load_weights()
    }
    fn checkpoint(&self) -> TriageResult<u64> {
        self.entered.store(true, Ordering::SeqCst);
        while !self.release.load(Ordering::SeqCst) {
            std::thread::yield_now();
        }
        self.inner.checkpoint()
    }
    fn commit_calibration(&self, weights: &[RuleWeight], from: u64, to: u64) -> TriageResult<()> {
        self.inner.commit_calibration(weights, from, to)
    }
    fn reset_weights(&self, rule_id: Option<&str>) -> TriageResult<usize> {
        self.inner.reset_weights(rule_id)
    }
}

#[test]
fn concurrent_run_is_refused() {
    let engine = Arc::new(StorageEngine::open_in_memory().unwrap());
    let rules = Arc::new(RuleStore::from_document(SAMPLE_RULES).unwrap());
    let entered = Arc::new(AtomicBool::new(false));
    let release = Arc::new(AtomicBool::new(false));
    let calibrator = Arc::new(calibrator_over(
        engine.clone(),
        Arc::new(GatedStore {
            inner: engine.clone(),
            entered: entered.clone(),
            release: release.clone(),
        }),
    ));

    let first = {
        let calibrator = calibrator.clone();
        let rules = rules.clone();
        std::thread::spawn(move || calibrator.recalibrate(&rules))
    };
    while !entered.load(Ordering::SeqCst) {
        std::thread::yield_now();
    }
    assert!(calibrator.is_running());
    assert!(matches!(
        calibrator.recalibrate(&rules),
        Err(TriageError::CalibrationError(CalibrationError::AlreadyRunning))
    ));

    release.store(true, Ordering::SeqCst);
    assert!(first.join().unwrap().is_ok());
    assert!(!calibrator.is_running());
}

/// Holds every reader at the same point after its window read, so two
/// calibrators fold the same window before either commits.
struct RendezvousLog {
    inner: Arc<StorageEngine>,
    barrier: Arc<Barrier>,
}

impl IDecisionLog for RendezvousLog {
    fn append(&self, record: &LogRecord) -> TriageResult<u64> {
        self.inner.append(record)
    }
    fn read(&self, from_seq: u64, limit: usize) -> TriageResult<Vec<DecisionLogEntry>> {
        let entries = self.inner.read(from_seq, limit);
        self.barrier.wait();
        entries
    }
    fn last_seq(&self) -> TriageResult<u64> {
        self.inner.last_seq()
    }
    fn latest_decision_for(&self, item_id: &str) -> TriageResult<Option<(u64, Decision)>> {
        self.inner.latest_decision_for(item_id)
    }
}

#[test]
fn two_processes_on_one_database_count_a_window_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triage.db");
    let first = Arc::new(StorageEngine::open(&path).unwrap());
    let second = Arc::new(StorageEngine::open(&path).unwrap());
    store_decision(first.as_ref(), "a", "ideas");

    let barrier = Arc::new(Barrier::new(2));
    let runs: Vec<_> = [first.clone(), second.clone()]
        .into_iter()
        .map(|engine| {
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                let rules = RuleStore::from_document(SAMPLE_RULES).unwrap();
                let calibrator = calibrator_over(
                    Arc::new(RendezvousLog {
                        inner: engine.clone(),
                        barrier,
                    }),
                    engine,
                );
                calibrator.recalibrate(&rules)
            })
        })
        .collect();
    let results: Vec<_> = runs.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(TriageError::CalibrationError(CalibrationError::Stale {
            expected: 0,
            found: 1
        }))
    )));

    let persisted = second.load_weights().unwrap();
    assert_eq!(persisted.len(), 1);
    assert!((persisted[0].weight - 0.55).abs() < 1e-9);
    assert_eq!(persisted[0].reinforcement_count, 1);
    assert_eq!(second.checkpoint().unwrap(), 1);
}
