use chrono::{Duration, TimeZone, Utc};
use triage_core::models::*;
use triage_core::Confidence;

fn sample_decision(action: Action) -> Decision {
    Decision {
        item_id: "m-7".into(),
        mode: Mode::Backfill,
        assessments: vec![Assessment::new(
            "routing",
            Mode::Backfill,
            AssessmentPayload::Routing {
                destination: Some("kb/dev/reference".into()),
                destination_kind: Some(DestinationKind::KnowledgeBase),
                rule_id: Some("dev-reference".into()),
                matched: 1,
            },
            0.75,
            "matched rule dev-reference",
        )],
        action,
        confidence: Confidence::new(0.75),
        destination: Some("kb/dev/reference".into()),
        destination_kind: Some(DestinationKind::KnowledgeBase),
        rule_id: Some("dev-reference".into()),
        rule_set_version: 3,
        branch: DecisionBranch::AutoStore,
        decided_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    }
}

#[test]
fn log_record_json_is_tagged_and_stable() {
    let record = LogRecord::Decision(sample_decision(Action::Store));
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["type"], "decision");
    assert_eq!(json["action"], "store");
    assert_eq!(json["assessments"][0]["payload"]["kind"], "routing");

    let back: LogRecord = serde_json::from_value(json).unwrap();
    assert_eq!(back, record);
}

#[test]
fn planned_outcome_follows_action() {
    assert_eq!(
        sample_decision(Action::Store).planned_outcome(),
        PlannedOutcome::DestinationWritten {
            destination: "kb/dev/reference".into()
        }
    );
    assert_eq!(
        sample_decision(Action::Surface).planned_outcome(),
        PlannedOutcome::Surfaced
    );
    assert_eq!(
        sample_decision(Action::Discard).planned_outcome(),
        PlannedOutcome::Discarded
    );
}

#[test]
fn correction_to_routed_destination_counts_as_confirmation() {
    let decision = sample_decision(Action::Surface);
    let event = CorrectionEvent::for_decision(
        12,
        &decision,
        CorrectionKind::Overridden {
            destination: Some("kb/dev/reference".into()),
        },
    );
    assert_eq!(event.effective_kind(), CorrectionKind::Confirmed);
    assert_eq!(event.rule_id.as_deref(), Some("dev-reference"));

    let elsewhere = CorrectionEvent::for_decision(
        12,
        &decision,
        CorrectionKind::Overridden {
            destination: Some("kb/personal".into()),
        },
    );
    assert!(matches!(
        elsewhere.effective_kind(),
        CorrectionKind::Overridden { .. }
    ));
}

#[test]
fn item_deserializes_with_minimal_fields() {
    let item: Item = serde_json::from_str(r#"{"id":"a","content":"hello"}"#).unwrap();
    assert_eq!(item.tag, TagState::Unprocessed);
    assert_eq!(item.content_type, ContentType::Note);
    assert!(item.captured_at.is_none());
}

#[test]
fn original_age_is_capture_minus_authored() {
    let captured = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
    let mut item = Item::new("a", "x");
    item.captured_at = Some(captured);
    item.authored_at = Some(captured - Duration::days(200));
    assert_eq!(item.original_age(), Some(Duration::days(200)));
}

#[test]
fn error_kind_string_roundtrip() {
    for kind in [
        ErrorKind::TransientIo,
        ErrorKind::MalformedInput,
        ErrorKind::AssessorTimeout,
        ErrorKind::RuleParse,
        ErrorKind::LogWriteFailure,
        ErrorKind::CalibrationFailure,
        ErrorKind::ExecutionFailure,
    ] {
        assert_eq!(ErrorKind::parse(kind.as_str()), Some(kind));
    }
    assert_eq!(ErrorKind::parse("nope"), None);
}

#[test]
fn urgency_rank_orders_levels() {
    assert!(UrgencyLevel::Immediate.rank() > UrgencyLevel::Today.rank());
    assert!(UrgencyLevel::Today.rank() > UrgencyLevel::ThisWeek.rank());
    assert!(UrgencyLevel::ThisWeek.rank() > UrgencyLevel::Whenever.rank());
    assert!(UrgencyLevel::Today.warrants_surface());
    assert!(!UrgencyLevel::ThisWeek.warrants_surface());
}

mod confidence_properties {
    use proptest::prelude::*;
    use triage_core::Confidence;

    proptest! {
        #[test]
        fn construction_always_lands_in_unit_interval(v in proptest::num::f64::ANY) {
            let c = Confidence::new(v);
            prop_assert!((0.0..=1.0).contains(&c.value()));
        }

        #[test]
        fn max_picks_the_larger(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let m = Confidence::new(a).max(Confidence::new(b));
            prop_assert_eq!(m.value(), a.max(b));
        }
    }
}
