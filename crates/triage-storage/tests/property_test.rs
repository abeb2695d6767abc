//! Property tests: the log is a stable, gap-free total order.

use proptest::prelude::*;

use test_fixtures::decision;
use triage_core::models::{Action, LogRecord};
use triage_core::traits::IDecisionLog;
use triage_storage::StorageEngine;

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![Just(Action::Store), Just(Action::Surface), Just(Action::Discard)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn log_order_matches_append_order(actions in prop::collection::vec(action_strategy(), 1..40)) {
        let engine = StorageEngine::open_in_memory().unwrap();
        for (i, action) in actions.iter().enumerate() {
            let d = decision(&format!("item-{i}"), *action, "ideas", "kb/ideas");
            engine.append(&LogRecord::Decision(d)).unwrap();
        }

        let entries = engine.read(0, actions.len() + 10).unwrap();
        prop_assert_eq!(entries.len(), actions.len());
        for (i, entry) in entries.iter().enumerate() {
            prop_assert_eq!(entry.seq, i as u64 + 1);
            let decision = entry.record.as_decision().unwrap();
            prop_assert_eq!(decision.action, actions[i]);
            prop_assert_eq!(&decision.item_id, &format!("item-{i}"));
        }
        prop_assert_eq!(engine.read(0, 1000).unwrap(), entries);
    }

    #[test]
    fn paged_reads_concatenate_to_full_read(count in 1usize..30, page in 1usize..8) {
        let engine = StorageEngine::open_in_memory().unwrap();
        for i in 0..count {
            let d = decision(&format!("item-{i}"), Action::Store, "ideas", "kb/ideas");
            engine.append(&LogRecord::Decision(d)).unwrap();
        }
        let mut paged = Vec::new();
        let mut from = 0;
        loop {
            let batch = engine.read(from, page).unwrap();
            let Some(last) = batch.last() else { break };
            from = last.seq + 1;
            paged.extend(batch);
        }
        prop_assert_eq!(paged, engine.read(0, count).unwrap());
    }
}
