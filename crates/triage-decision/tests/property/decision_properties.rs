//! Property tests: aggregation is deterministic, bounded, and never stores
//! below the routing floor.

use proptest::prelude::*;

use test_fixtures::{excitement_assessment, routing_assessment, urgency_assessment};
use triage_core::models::{Action, Assessment, Mode, UrgencyLevel};
use triage_decision::DecisionAggregator;

fn level() -> impl Strategy<Value = Option<UrgencyLevel>> {
    prop_oneof![
        Just(None),
        Just(Some(UrgencyLevel::Immediate)),
        Just(Some(UrgencyLevel::Today)),
        Just(Some(UrgencyLevel::ThisWeek)),
        Just(Some(UrgencyLevel::Whenever)),
    ]
}

fn inputs() -> impl Strategy<Value = (Mode, Vec<Assessment>)> {
    (any::<bool>(), 0.0f64..=1.0, any::<bool>(), level(), 0.0f64..=1.0, 0.0f64..=1.0).prop_map(
        |(live, routing, matched, urgency, urgency_conf, excitement)| {
            let mode = if live { Mode::Live } else { Mode::Backfill };
            let mut v = vec![if matched {
                routing_assessment(mode, Some("r"), Some("kb/r"), routing)
            } else {
                routing_assessment(mode, None, None, routing.min(0.2))
            }];
            if let Some(level) = urgency {
                v.push(urgency_assessment(level, urgency_conf));
            }
            v.push(excitement_assessment(mode, excitement));
            (mode, v)
        },
    )
}

proptest! {
    #[test]
    fn aggregate_is_deterministic((mode, assessments) in inputs()) {
        let aggregator = DecisionAggregator::default();
        let first = aggregator.aggregate(mode, &assessments);
        for _ in 0..3 {
            prop_assert_eq!(&aggregator.aggregate(mode, &assessments), &first);
        }
    }

    #[test]
    fn confidence_is_one_of_the_inputs((mode, assessments) in inputs()) {
        let out = DecisionAggregator::default().aggregate(mode, &assessments);
        let c = out.confidence.value();
        prop_assert!((0.0..=1.0).contains(&c));
        prop_assert!(c == 0.0 || assessments.iter().any(|a| a.confidence.value() == c));
    }

    #[test]
    fn store_requires_routing_above_store_min((mode, assessments) in inputs()) {
        let aggregator = DecisionAggregator::default();
        let out = aggregator.aggregate(mode, &assessments);
        if out.action == Action::Store {
            let routing = assessments[0].confidence.value();
            prop_assert!(routing >= aggregator.thresholds().for_mode(mode).store_min);
            prop_assert!(out.destination.is_some());
        }
    }

    #[test]
    fn pressing_urgency_always_surfaces((mode, assessments) in inputs()) {
        let pressing = assessments
            .iter()
            .any(|a| a.urgency_level().is_some_and(|l| l.warrants_surface()));
        let out = DecisionAggregator::default().aggregate(mode, &assessments);
        if pressing {
            prop_assert_eq!(out.action, Action::Surface);
        }
    }
}
