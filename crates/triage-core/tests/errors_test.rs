use triage_core::errors::*;

#[test]
fn rule_error_carries_rule_id() {
    let err = RuleError::InvalidPattern {
        rule_id: "dev-reference".into(),
        reason: "unclosed group".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("dev-reference"));
    assert!(msg.contains("unclosed group"));
}

#[test]
fn pipeline_error_invalid_transition_carries_states() {
    let err = PipelineError::InvalidTransition {
        item_id: "m-1".into(),
        from: "captured".into(),
        to: "decided".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("captured"));
    assert!(msg.contains("decided"));
}

#[test]
fn execution_error_transience() {
    assert!(ExecutionError::Transient { reason: "503".into() }.is_transient());
    assert!(!ExecutionError::Rejected { reason: "bad path".into() }.is_transient());
}

// --- From impls ---

#[test]
fn storage_error_converts_to_triage_error() {
    let err: TriageError = StorageError::AppendFailed {
        reason: "disk full".into(),
    }
    .into();
    assert!(matches!(err, TriageError::StorageError(_)));
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn rule_error_converts_to_triage_error() {
    let err: TriageError = RuleError::DuplicateRule {
        rule_id: "x".into(),
    }
    .into();
    assert!(matches!(err, TriageError::RuleError(_)));
}

#[test]
fn calibration_error_converts_to_triage_error() {
    let err: TriageError = CalibrationError::AlreadyRunning.into();
    assert!(matches!(err, TriageError::CalibrationError(_)));
}

#[test]
fn serialization_error_converts_to_triage_error() {
    let json_err = serde_json::from_str::<String>("not valid json").unwrap_err();
    let err: TriageError = json_err.into();
    assert!(matches!(err, TriageError::SerializationError(_)));
}
