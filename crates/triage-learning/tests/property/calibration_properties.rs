//! Property tests for the window fold.

use chrono::Utc;
use proptest::prelude::*;

use test_fixtures::builders::decision;
use triage_core::models::{
    Action, CorrectionEvent, CorrectionKind, DecisionLogEntry, LogRecord, RuleWeight,
};
use triage_learning::formula::{bump, decay};
use triage_learning::fold_window;

const RULES: [&str; 3] = ["a", "b", "c"];

fn entry(seq: u64, op: u8, rule: usize) -> DecisionLogEntry {
    let rule_id = RULES[rule % RULES.len()];
    let d = decision(&format!("item-{seq}"), Action::Store, rule_id, "kb/x");
    let record = if op % 2 == 0 {
        LogRecord::Decision(d)
    } else {
        LogRecord::Correction(CorrectionEvent::for_decision(
            seq,
            &d,
            CorrectionKind::Overridden { destination: None },
        ))
    };
    DecisionLogEntry {
        seq,
        outcome: record.planned_outcome(),
        record,
        appended_at: Utc::now(),
    }
}

fn seed(weight: f64) -> impl FnMut(&str) -> Option<RuleWeight> {
    move |id| {
        Some(RuleWeight {
            rule_id: id.to_string(),
            weight,
            reinforcement_count: 0,
            provenance: Vec::new(),
            updated_at: Utc::now(),
        })
    }
}

fn log_strategy() -> impl Strategy<Value = Vec<DecisionLogEntry>> {
    prop::collection::vec((any::<u8>(), 0usize..3), 0..40).prop_map(|ops| {
        ops.into_iter()
            .enumerate()
            .map(|(i, (op, rule))| entry(i as u64 + 1, op, rule))
            .collect()
    })
}

proptest! {
    #[test]
    fn formulas_stay_in_unit_interval(w in 0.0f64..=1.0, alpha in 0.0f64..=1.0) {
        prop_assert!((0.0..=1.0).contains(&bump(w, alpha)));
        prop_assert!((0.0..=1.0).contains(&decay(w, alpha)));
        prop_assert!(bump(w, alpha) >= w);
        prop_assert!(decay(w, alpha) <= w);
    }

    #[test]
    fn folded_weights_stay_in_unit_interval(
        entries in log_strategy(),
        start in 0.0f64..=1.0,
        alpha in 0.01f64..0.5,
    ) {
        let outcome = fold_window(&entries, seed(start), alpha, 8);
        for w in outcome.weights.values() {
            prop_assert!((0.0..=1.0).contains(&w.weight));
            prop_assert!(w.provenance.len() <= 8);
        }
    }

    #[test]
    fn fold_is_deterministic(entries in log_strategy(), start in 0.0f64..=1.0) {
        let a = fold_window(&entries, seed(start), 0.1, 8);
        let b = fold_window(&entries, seed(start), 0.1, 8);
        prop_assert_eq!(a.deltas, b.deltas);
        prop_assert_eq!(a.last_seq, b.last_seq);
    }

    #[test]
    fn splitting_the_window_matches_one_fold(entries in log_strategy(), cut in 0usize..40) {
        let cut = cut.min(entries.len());
        let whole = fold_window(&entries, seed(0.5), 0.1, 8);

        let first = fold_window(&entries[..cut], seed(0.5), 0.1, 8);
        let carried = first.weights.clone();
        let mut fallback = seed(0.5);
        let second = fold_window(
            &entries[cut..],
            |id| carried.get(id).cloned().or_else(|| fallback(id)),
            0.1,
            8,
        );

        for (id, w) in &whole.weights {
            let split = second.weights.get(id).or_else(|| first.weights.get(id));
            prop_assert!(split.is_some());
            let split = split.unwrap();
            prop_assert!((split.weight - w.weight).abs() < 1e-9);
            prop_assert_eq!(split.reinforcement_count, w.reinforcement_count);
            prop_assert_eq!(&split.provenance, &w.provenance);
        }
    }

    #[test]
    fn counts_match_the_log(entries in log_strategy()) {
        let outcome = fold_window(&entries, seed(0.5), 0.1, 8);
        let bumps: u32 = outcome.deltas.iter().map(|d| d.bumps).sum();
        let decays: u32 = outcome.deltas.iter().map(|d| d.decays).sum();
        let stores = entries.iter().filter(|e| matches!(e.record, LogRecord::Decision(_))).count();
        prop_assert_eq!(bumps as usize, stores);
        prop_assert_eq!(decays as usize + stores, entries.len());
    }
}
