//! Span definitions per operation: pipeline batch, assessment, aggregation,
//! calibration and rule reload.

/// Create a span for one batch run.
#[macro_export]
macro_rules! pipeline_span {
    ($limit:expr) => {
        tracing::info_span!("triage.pipeline", limit = $limit)
    };
}

/// Create a span for the assessment of one item.
#[macro_export]
macro_rules! assess_span {
    ($item_id:expr, $mode:expr) => {
        tracing::info_span!("triage.assess", item_id = %$item_id, mode = %$mode)
    };
}

/// Create a span for aggregating one item's assessments.
#[macro_export]
macro_rules! aggregate_span {
    ($item_id:expr) => {
        tracing::info_span!("triage.aggregate", item_id = %$item_id)
    };
}

#[macro_export]
macro_rules! calibration_span {
    ($checkpoint:expr) => {
        tracing::info_span!("triage.calibration", checkpoint = $checkpoint)
    };
}

#[macro_export]
macro_rules! rules_reload_span {
    ($path:expr) => {
        tracing::info_span!("triage.rules_reload", path = %$path)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const PIPELINE: &str = "triage.pipeline";
    pub const ASSESS: &str = "triage.assess";
    pub const AGGREGATE: &str = "triage.aggregate";
    pub const CALIBRATION: &str = "triage.calibration";
    pub const RULES_RELOAD: &str = "triage.rules_reload";
}
