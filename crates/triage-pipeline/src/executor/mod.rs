//! Executor routing: one executor per destination kind, bounded retries with
//! doubling backoff for transient failures.

mod filesystem;

pub use filesystem::FilesystemExecutor;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use triage_core::config::PipelineConfig;
use triage_core::errors::{ExecutionError, TriageError, TriageResult};
use triage_core::models::{Action, Decision, DestinationKind, ExecutionRecord, ExecutionStatus, Item};
use triage_core::traits::{ExecutionRequest, IActionExecutor};

/// Counters returned by `retry_deferred`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub deferred: usize,
    pub rejected: usize,
    /// Pending decisions that could not be attempted (item gone, no executor).
    pub unavailable: usize,
}

/// Hands a logged decision to exactly one executor chosen by destination kind.
pub struct ExecutorRouter {
    executors: Vec<Arc<dyn IActionExecutor>>,
    max_attempts: u32,
    backoff: Duration,
}

impl ExecutorRouter {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            executors: Vec::new(),
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.executor_max_attempts,
            Duration::from_millis(config.executor_backoff_ms),
        )
    }

    /// Add an executor. Each destination kind may be claimed once.
    pub fn register(&mut self, executor: Arc<dyn IActionExecutor>) -> TriageResult<()> {
        if let Some(kind) = executor.kinds().iter().find(|k| self.for_kind(**k).is_some()) {
            return Err(TriageError::ConfigError(format!(
                "destination kind '{kind}' already has an executor"
            )));
        }
        self.executors.push(executor);
        Ok(())
    }

    pub fn with(mut self, executor: Arc<dyn IActionExecutor>) -> TriageResult<Self> {
        self.register(executor)?;
        Ok(self)
    }

    pub fn for_kind(&self, kind: DestinationKind) -> Option<Arc<dyn IActionExecutor>> {
        self.executors
            .iter()
            .find(|e| e.kinds().contains(&kind))
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }

    /// Build the request for a logged decision.
    ///
    /// Store goes to the executor for its destination kind and fails with
    /// `NoExecutor` when none is registered. Surface goes to the review
    /// queue when one is registered. Discard is never executed.
    pub fn plan(
        &self,
        decision_seq: u64,
        decision: &Decision,
        item: &Item,
    ) -> Result<Option<(Arc<dyn IActionExecutor>, ExecutionRequest)>, ExecutionError> {
        let kind = match decision.action {
            Action::Discard => return Ok(None),
            Action::Surface => DestinationKind::ReviewQueue,
            Action::Store => decision.destination_kind.ok_or_else(|| ExecutionError::NoExecutor {
                kind: "unspecified".to_string(),
            })?,
        };
        let Some(executor) = self.for_kind(kind) else {
            return match decision.action {
                Action::Surface => Ok(None),
                _ => Err(ExecutionError::NoExecutor {
                    kind: kind.to_string(),
                }),
            };
        };
        Ok(Some((
            executor,
            ExecutionRequest {
                decision_seq,
                item: item.clone(),
                action: decision.action,
                destination: decision.destination.clone(),
                destination_kind: kind,
            },
        )))
    }

    /// Run a request, retrying transient failures with doubling backoff.
    /// Always produces the record to append, whatever the result.
    pub async fn execute(
        &self,
        executor: Arc<dyn IActionExecutor>,
        request: ExecutionRequest,
    ) -> ExecutionRecord {
        let mut attempts = 0;
        let mut delay = self.backoff;
        let (status, detail) = loop {
            attempts += 1;
            let exec = Arc::clone(&executor);
            let req = request.clone();
            let result = tokio::task::spawn_blocking(move || exec.execute(&req))
                .await
                .unwrap_or_else(|e| {
                    Err(ExecutionError::Transient {
                        reason: format!("executor task failed: {e}"),
                    })
                });
            match result {
                Ok(receipt) => break (ExecutionStatus::Succeeded, receipt.location),
                Err(e) if e.is_transient() && attempts < self.max_attempts => {
                    tracing::debug!(
                        item_id = %request.item.id,
                        attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient executor failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
                Err(e) if e.is_transient() => break (ExecutionStatus::Deferred, e.to_string()),
                Err(e) => break (ExecutionStatus::Rejected, e.to_string()),
            }
        };

        ExecutionRecord {
            item_id: request.item.id.clone(),
            decision_seq: request.decision_seq,
            action: request.action,
            destination: request.destination.clone(),
            status,
            attempts,
            detail,
            executed_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for ExecutorRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorRouter")
            .field("executors", &self.executors.len())
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .finish()
    }
}
