//! # triage-pipeline
//!
//! Drives items from the inbox through mode detection, concurrent assessment,
//! aggregation and the decision log, then hands logged decisions to executors.
//! [`TriageRuntime`] bundles everything behind the operational surface.

pub mod coordinator;
pub mod executor;
pub mod lifecycle;
pub mod runner;
pub mod runtime;
pub mod sources;

pub use coordinator::{AssessorFactory, ItemOutcome, PipelineCoordinator};
pub use executor::{ExecutorRouter, FilesystemExecutor, RetrySummary};
pub use lifecycle::{ItemLifecycle, LifecycleStage};
pub use runner::AssessorRunner;
pub use runtime::{RuleSource, TriageRuntime};
pub use sources::{JsonInboxSource, MemoryItemSource};

use triage_core::errors::{PipelineError, TriageError, TriageResult};

/// Run blocking storage or source work off the async workers.
pub(crate) async fn blocking<F, T>(f: F) -> TriageResult<T>
where
    F: FnOnce() -> TriageResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        TriageError::from(PipelineError::TaskFailed {
            reason: e.to_string(),
        })
    })?
}

/// Persist an error record from async code. The sink may block, so it runs on
/// the blocking pool; if even that fails the record still reaches the log.
pub(crate) async fn report_error(
    errors: &triage_observability::ErrorChannel,
    record: triage_core::models::ErrorRecord,
) {
    let channel = errors.clone();
    let fallback = record.clone();
    if let Err(e) = tokio::task::spawn_blocking(move || channel.report(&record)).await {
        triage_observability::tracing_setup::events::error_record_unpersisted(
            &fallback,
            &e.to_string(),
        );
    }
}
