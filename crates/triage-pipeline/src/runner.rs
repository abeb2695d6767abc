//! Runs one item's assessors concurrently under a per-assessor timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use triage_assessment::AssessorSet;
use triage_core::constants::TIMEOUT_RATIONALE;
use triage_core::errors::PipelineError;
use triage_core::models::{Assessment, AssessorOutcome, ErrorKind, ErrorRecord, Item, Mode};
use triage_observability::tracing_setup::events;
use triage_observability::ErrorChannel;

use crate::report_error;

/// Rationale of the fallback that replaces a skip from a required assessor.
pub const REQUIRED_SKIP_RATIONALE: &str = "malformed result: required assessor skipped";

enum Finished {
    Outcome(AssessorOutcome),
    TimedOut,
    Panicked(String),
}

/// Join point between the assessors and the aggregator.
///
/// Each assessor runs on the blocking pool. The join completes once every
/// assessor has produced an outcome or been declared timed out; a timed-out
/// evaluation keeps running detached and its late result is ignored.
#[derive(Debug, Clone)]
pub struct AssessorRunner {
    timeout: Duration,
    errors: ErrorChannel,
}

impl AssessorRunner {
    pub fn new(timeout: Duration, errors: ErrorChannel) -> Self {
        Self { timeout, errors }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Assessments in registration order.
    ///
    /// Skips from assessors not required in `mode` are dropped. Timeouts,
    /// panics and skips from required assessors are replaced by the
    /// assessor's zero-confidence fallback and reported on the error stream.
    /// Cancellation aborts the join and discards everything gathered.
    pub async fn run(
        &self,
        assessors: &AssessorSet,
        item: Arc<Item>,
        mode: Mode,
        cancel: &CancellationToken,
    ) -> Result<Vec<Assessment>, PipelineError> {
        let mut tasks = JoinSet::new();
        for (idx, assessor) in assessors.assessors().iter().enumerate() {
            let assessor = Arc::clone(assessor);
            let item = Arc::clone(&item);
            let limit = self.timeout;
            tasks.spawn(async move {
                let work = tokio::task::spawn_blocking(move || assessor.evaluate(&item, mode));
                let finished = match tokio::time::timeout(limit, work).await {
                    Ok(Ok(outcome)) => Finished::Outcome(outcome),
                    Ok(Err(join_err)) => Finished::Panicked(join_err.to_string()),
                    Err(_) => Finished::TimedOut,
                };
                (idx, finished)
            });
        }

        let mut slots: Vec<Option<Finished>> = (0..assessors.len()).map(|_| None).collect();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    return Err(PipelineError::Cancelled { item_id: item.id.clone() });
                }
                joined = tasks.join_next() => match joined {
                    Some(Ok((idx, finished))) => slots[idx] = Some(finished),
                    Some(Err(e)) => tracing::warn!(item_id = %item.id, error = %e, "assessor task lost"),
                    None => break,
                },
            }
        }

        let mut assessments = Vec::with_capacity(slots.len());
        for (assessor, slot) in assessors.assessors().iter().zip(slots) {
            let name = assessor.name();
            let (assessment, failure) = match slot {
                Some(Finished::Outcome(AssessorOutcome::Assessed(a))) => (Some(a), None),
                Some(Finished::Outcome(AssessorOutcome::Skip { reason, .. })) => {
                    if assessor.required_in(mode) {
                        (
                            Some(assessor.fallback(mode, REQUIRED_SKIP_RATIONALE)),
                            Some((ErrorKind::MalformedInput, format!("{name} skipped while required: {reason}"))),
                        )
                    } else {
                        tracing::debug!(item_id = %item.id, assessor = name, %reason, "assessor skipped");
                        (None, None)
                    }
                }
                Some(Finished::TimedOut) => {
                    events::assessor_timed_out(&item.id, name, self.timeout.as_millis() as u64);
                    (
                        Some(assessor.fallback(mode, TIMEOUT_RATIONALE)),
                        Some((
                            ErrorKind::AssessorTimeout,
                            format!("{name} exceeded {}ms", self.timeout.as_millis()),
                        )),
                    )
                }
                Some(Finished::Panicked(reason)) => (
                    Some(assessor.fallback(mode, TIMEOUT_RATIONALE)),
                    Some((ErrorKind::AssessorTimeout, format!("{name} failed: {reason}"))),
                ),
                None => (
                    Some(assessor.fallback(mode, TIMEOUT_RATIONALE)),
                    Some((ErrorKind::AssessorTimeout, format!("{name} produced no result"))),
                ),
            };
            if let Some((kind, context)) = failure {
                report_error(&self.errors, ErrorRecord::new(kind, Some(&item.id), context)).await;
            }
            assessments.extend(assessment);
        }
        Ok(assessments)
    }
}
