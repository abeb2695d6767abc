use std::sync::Arc;

use test_fixtures::MemoryErrorSink;
use triage_core::models::ErrorKind;
use triage_observability::tracing_setup::spans::names;
use triage_observability::{init_tracing_with_filter, ErrorChannel};

#[test]
fn records_reach_the_sink() {
    let sink = Arc::new(MemoryErrorSink::new());
    let channel = ErrorChannel::new(sink.clone());

    assert!(channel.emit(ErrorKind::AssessorTimeout, Some("item-1"), "urgency after 3000ms"));
    assert!(channel.emit(ErrorKind::RuleParse, None, "line 4: unknown field"));

    let records = sink.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].kind, ErrorKind::AssessorTimeout);
    assert_eq!(records[0].item_id.as_deref(), Some("item-1"));
    assert_eq!(records[1].item_id, None);
    assert_eq!(channel.unpersisted(), 0);
}

#[test]
fn sink_failure_is_counted_not_swallowed() {
    init_tracing_with_filter("off");
    let sink = Arc::new(MemoryErrorSink::new());
    sink.set_failing(true);
    let channel = ErrorChannel::new(sink.clone());

    assert!(!channel.emit(ErrorKind::LogWriteFailure, Some("item-2"), "disk full"));
    assert_eq!(channel.unpersisted(), 1);
    assert!(sink.records().is_empty());

    // Clones share the counter.
    let clone = channel.clone();
    clone.emit(ErrorKind::TransientIo, None, "timeout");
    assert_eq!(channel.unpersisted(), 2);

    sink.set_failing(false);
    assert!(channel.emit(ErrorKind::TransientIo, None, "recovered"));
    assert_eq!(sink.records().len(), 1);
}

#[test]
fn span_macros_use_the_documented_names() {
    let span = triage_observability::assess_span!("item-1", "live");
    if let Some(meta) = span.metadata() {
        assert_eq!(meta.name(), names::ASSESS);
    }
    let span = triage_observability::calibration_span!(7u64);
    if let Some(meta) = span.metadata() {
        assert_eq!(meta.name(), names::CALIBRATION);
    }
}
