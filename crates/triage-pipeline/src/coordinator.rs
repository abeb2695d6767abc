//! PipelineCoordinator: claims items, evaluates them concurrently, commits
//! decisions to the log and hands them to executors.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use triage_assessment::{AssessorSet, ModeDetector};
use triage_core::config::TriageConfig;
use triage_core::errors::{PipelineError, TriageResult};
use triage_core::models::{
    Action, BatchReport, Decision, ErrorKind, ErrorRecord, ExecutionStatus, Item, ItemProblem,
    LogRecord, TagState,
};
use triage_core::traits::{IDecisionLog, IItemSource};
use triage_decision::{DecisionAggregator, ThresholdTable};
use triage_observability::tracing_setup::events;
use triage_observability::{aggregate_span, assess_span, pipeline_span, ErrorChannel};
use triage_rules::{RuleStore, RuleTable};

use crate::executor::ExecutorRouter;
use crate::lifecycle::{ItemLifecycle, LifecycleStage};
use crate::runner::AssessorRunner;
use crate::{blocking, report_error};

/// Builds the assessor set for one rule table snapshot.
pub type AssessorFactory = Arc<dyn Fn(Arc<RuleTable>) -> AssessorSet + Send + Sync>;

/// How one item left the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Decided { seq: u64, action: Action },
    /// A decision was already logged; only the tag was advanced.
    AlreadyDecided { seq: u64 },
    Errored,
    Cancelled,
    /// Another evaluation owns the item, or it moved on before it could be
    /// reclaimed.
    Busy,
}

/// Marks an item as owned by an evaluation in this process until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<String>>,
    item_id: String,
}

impl<'a> InFlight<'a> {
    fn enter(set: &'a Mutex<HashSet<String>>, item_id: &str) -> Option<Self> {
        let mut guard = set.lock().ok()?;
        guard.insert(item_id.to_string()).then(|| Self {
            set,
            item_id: item_id.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.set.lock() {
            guard.remove(&self.item_id);
        }
    }
}

pub struct PipelineCoordinator {
    source: Arc<dyn IItemSource>,
    log: Arc<dyn IDecisionLog>,
    rules: Arc<RuleStore>,
    assessors: AssessorFactory,
    aggregator: DecisionAggregator,
    detector: ModeDetector,
    runner: AssessorRunner,
    executors: Arc<ExecutorRouter>,
    errors: ErrorChannel,
    max_concurrent: usize,
    in_flight: Mutex<HashSet<String>>,
}

impl PipelineCoordinator {
    /// Standard assessors and thresholds from `config`, no executors.
    pub fn new(
        source: Arc<dyn IItemSource>,
        log: Arc<dyn IDecisionLog>,
        rules: Arc<RuleStore>,
        errors: ErrorChannel,
        config: &TriageConfig,
    ) -> TriageResult<Self> {
        let thresholds = ThresholdTable::new(&config.thresholds)?;
        let assessor_config = config.clone();
        Ok(Self {
            source,
            log,
            rules,
            assessors: Arc::new(move |table| AssessorSet::standard(table, &assessor_config)),
            aggregator: DecisionAggregator::new(thresholds),
            detector: ModeDetector::new(&config.mode),
            runner: AssessorRunner::new(
                Duration::from_millis(config.pipeline.assessor_timeout_ms),
                errors.clone(),
            ),
            executors: Arc::new(ExecutorRouter::from_config(&config.pipeline)),
            errors,
            max_concurrent: config.pipeline.max_concurrent_items.max(1),
            in_flight: Mutex::new(HashSet::new()),
        })
    }

    pub fn with_assessors(mut self, factory: AssessorFactory) -> Self {
        self.assessors = factory;
        self
    }

    pub fn with_executors(mut self, executors: ExecutorRouter) -> Self {
        self.executors = Arc::new(executors);
        self
    }

    pub fn with_detector(mut self, detector: ModeDetector) -> Self {
        self.detector = detector;
        self
    }

    pub fn source(&self) -> &Arc<dyn IItemSource> {
        &self.source
    }

    pub fn executors(&self) -> &ExecutorRouter {
        &self.executors
    }

    /// Process up to `limit` unprocessed items, `max_concurrent_items` at a time.
    ///
    /// Items not yet started when `cancel` fires are left untouched; items in
    /// flight roll back their tag and append nothing.
    pub async fn process_batch(
        self: &Arc<Self>,
        limit: usize,
        cancel: &CancellationToken,
    ) -> TriageResult<BatchReport> {
        let span = pipeline_span!(limit);
        async move {
            // Claims stranded by a process that stopped mid-item come first,
            // so they are never starved by fresh captures.
            let source = Arc::clone(&self.source);
            let stranded: Vec<Item> = blocking(move || source.fetch_claimed(limit))
                .await?
                .into_iter()
                .filter(|item| !self.is_in_flight(&item.id))
                .collect();
            let room = limit.saturating_sub(stranded.len());
            let fresh = if room > 0 {
                let source = Arc::clone(&self.source);
                blocking(move || source.fetch_unprocessed(room)).await?
            } else {
                Vec::new()
            };

            let mut report = BatchReport {
                fetched: stranded.len() + fresh.len(),
                reclaimed: stranded.len(),
                ..Default::default()
            };
            let items = stranded.into_iter().chain(fresh);

            let permits = Arc::new(Semaphore::new(self.max_concurrent));
            let mut tasks = JoinSet::new();
            for item in items {
                let this = Arc::clone(self);
                let permits = Arc::clone(&permits);
                let cancel = cancel.clone();
                tasks.spawn(async move {
                    let Ok(_permit) = permits.acquire_owned().await else {
                        return ItemOutcome::Errored;
                    };
                    if cancel.is_cancelled() {
                        return ItemOutcome::Cancelled;
                    }
                    this.process_item(item, &cancel).await
                });
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(outcome) => tally(&mut report, outcome),
                    Err(e) => {
                        tracing::error!(error = %e, "item task failed");
                        report.errored += 1;
                    }
                }
            }

            tracing::info!(
                fetched = report.fetched,
                reclaimed = report.reclaimed,
                decided = report.decided,
                surfaced = report.surfaced,
                errored = report.errored,
                "batch complete"
            );
            Ok(report)
        }
        .instrument(span)
        .await
    }

    /// Take one item through to a logged decision. An item already tagged
    /// `processing` is a stranded claim: it is taken over as is, and the
    /// log lookup below either finishes its tag or decides it afresh.
    pub async fn process_item(&self, item: Item, cancel: &CancellationToken) -> ItemOutcome {
        let item_id = item.id.clone();
        let Some(_in_flight) = InFlight::enter(&self.in_flight, &item_id) else {
            tracing::debug!(item_id = %item_id, "item already in flight");
            return ItemOutcome::Busy;
        };

        if item.tag == TagState::Processing {
            match self.still_claimed(&item_id).await {
                Ok(true) => tracing::warn!(item_id = %item_id, "reclaiming stranded item"),
                Ok(false) => return ItemOutcome::Busy,
                Err(e) => {
                    self.fail(&item_id, ErrorKind::TransientIo, format!("reclaim failed: {e}"))
                        .await;
                    return ItemOutcome::Errored;
                }
            }
        } else if let Err(e) = self
            .move_tag(&item_id, TagState::Unprocessed, TagState::Processing)
            .await
        {
            self.fail(&item_id, ErrorKind::TransientIo, format!("claim failed: {e}"))
                .await;
            return ItemOutcome::Errored;
        }

        let log = Arc::clone(&self.log);
        let lookup_id = item_id.clone();
        match blocking(move || log.latest_decision_for(&lookup_id)).await {
            Ok(Some((seq, _))) => {
                tracing::info!(item_id = %item_id, seq, "decision already logged, advancing tag");
                self.finish_tag(&item_id).await;
                return ItemOutcome::AlreadyDecided { seq };
            }
            Ok(None) => {}
            Err(e) => {
                self.fail(&item_id, ErrorKind::TransientIo, format!("log lookup failed: {e}"))
                    .await;
                self.rollback(&item_id).await;
                return ItemOutcome::Errored;
            }
        }

        let (mut lifecycle, decision) = match self.evaluate(&item, cancel).await {
            Ok(evaluated) => evaluated,
            Err(e) => {
                self.rollback(&item_id).await;
                if matches!(
                    e,
                    triage_core::TriageError::PipelineError(PipelineError::Cancelled { .. })
                ) {
                    tracing::info!(item_id = %item_id, "evaluation cancelled");
                    return ItemOutcome::Cancelled;
                }
                self.fail(&item_id, ErrorKind::TransientIo, e.to_string()).await;
                return ItemOutcome::Errored;
            }
        };

        if cancel.is_cancelled() {
            self.rollback(&item_id).await;
            return ItemOutcome::Cancelled;
        }

        let log = Arc::clone(&self.log);
        let record = LogRecord::Decision(decision.clone());
        let seq = match blocking(move || log.append(&record)).await {
            Ok(seq) => seq,
            Err(e) => {
                self.fail(&item_id, ErrorKind::LogWriteFailure, e.to_string()).await;
                self.rollback(&item_id).await;
                return ItemOutcome::Errored;
            }
        };
        if let Err(e) = lifecycle.advance(LifecycleStage::Logged) {
            tracing::warn!(error = %e, "lifecycle out of step after append");
        }
        events::decision_committed(&item_id, seq, decision.action, decision.confidence.value());

        self.finish_tag(&item_id).await;
        self.execute_logged(seq, &decision, &item).await;

        ItemOutcome::Decided {
            seq,
            action: decision.action,
        }
    }

    /// Mode detection, assessment and aggregation. Nothing is persisted.
    async fn evaluate(
        &self,
        item: &Item,
        cancel: &CancellationToken,
    ) -> TriageResult<(ItemLifecycle, Decision)> {
        let mut lifecycle = ItemLifecycle::new(&item.id);

        let mode = self.detector.detect(item);
        lifecycle.advance(LifecycleStage::ModeAssigned)?;

        let problems = item.validate();
        if !problems.is_empty() {
            report_error(
                &self.errors,
                ErrorRecord::new(ErrorKind::MalformedInput, Some(&item.id), describe(&problems)),
            )
            .await;
        }

        let table = self.rules.snapshot()?;
        let assessors = (self.assessors)(Arc::clone(&table));

        lifecycle.advance(LifecycleStage::Evaluating)?;
        let assessments = self
            .runner
            .run(&assessors, Arc::new(item.clone()), mode, cancel)
            .instrument(assess_span!(item.id, mode))
            .await?;

        lifecycle.advance(LifecycleStage::Decided)?;
        let decision = aggregate_span!(item.id).in_scope(|| {
            self.aggregator
                .decide(&item.id, mode, assessments, table.version())
        });
        Ok((lifecycle, decision))
    }

    /// Hand a logged decision to its executor and append the outcome.
    /// Returns `None` when nothing was attempted.
    pub async fn execute_logged(
        &self,
        seq: u64,
        decision: &Decision,
        item: &Item,
    ) -> Option<ExecutionStatus> {
        let (executor, request) = match self.executors.plan(seq, decision, item) {
            Ok(Some(planned)) => planned,
            Ok(None) => return None,
            Err(e) => {
                report_error(
                    &self.errors,
                    ErrorRecord::new(ErrorKind::ExecutionFailure, Some(&item.id), e.to_string()),
                )
                .await;
                return None;
            }
        };

        let record = self.executors.execute(executor, request).await;
        let status = record.status;
        match status {
            ExecutionStatus::Succeeded => {}
            ExecutionStatus::Deferred => {
                report_error(
                    &self.errors,
                    ErrorRecord::new(
                        ErrorKind::TransientIo,
                        Some(&item.id),
                        format!("execution of seq {seq} deferred: {}", record.detail),
                    ),
                )
                .await;
            }
            ExecutionStatus::Rejected => {
                report_error(
                    &self.errors,
                    ErrorRecord::new(
                        ErrorKind::ExecutionFailure,
                        Some(&item.id),
                        format!("execution of seq {seq} rejected: {}", record.detail),
                    ),
                )
                .await;
            }
        }

        let log = Arc::clone(&self.log);
        let entry = LogRecord::Execution(record);
        if let Err(e) = blocking(move || log.append(&entry)).await {
            report_error(
                &self.errors,
                ErrorRecord::new(
                    ErrorKind::LogWriteFailure,
                    Some(&item.id),
                    format!("execution outcome for seq {seq} not logged: {e}"),
                ),
            )
            .await;
        }
        Some(status)
    }

    fn is_in_flight(&self, item_id: &str) -> bool {
        self.in_flight
            .lock()
            .map(|set| set.contains(item_id))
            .unwrap_or(true)
    }

    /// Re-read the tag after taking ownership; a batch that finished the item
    /// in the meantime has already moved it on.
    async fn still_claimed(&self, item_id: &str) -> TriageResult<bool> {
        let source = Arc::clone(&self.source);
        let id = item_id.to_string();
        let current = blocking(move || source.item(&id)).await?;
        Ok(current.is_some_and(|i| i.tag == TagState::Processing))
    }

    async fn move_tag(&self, item_id: &str, from: TagState, to: TagState) -> TriageResult<()> {
        let source = Arc::clone(&self.source);
        let id = item_id.to_string();
        blocking(move || source.transition(&id, from, to)).await
    }

    async fn finish_tag(&self, item_id: &str) {
        if let Err(e) = self
            .move_tag(item_id, TagState::Processing, TagState::Done)
            .await
        {
            report_error(
                &self.errors,
                ErrorRecord::new(
                    ErrorKind::TransientIo,
                    Some(item_id),
                    format!("decision logged but tag not advanced: {e}"),
                ),
            )
            .await;
        }
    }

    async fn rollback(&self, item_id: &str) {
        if let Err(e) = self
            .move_tag(item_id, TagState::Processing, TagState::Unprocessed)
            .await
        {
            report_error(
                &self.errors,
                ErrorRecord::new(
                    ErrorKind::TransientIo,
                    Some(item_id),
                    format!("tag rollback failed: {e}"),
                ),
            )
            .await;
        }
    }

    async fn fail(&self, item_id: &str, kind: ErrorKind, context: String) {
        events::item_errored(item_id, &context);
        report_error(&self.errors, ErrorRecord::new(kind, Some(item_id), context)).await;
    }
}

fn describe(problems: &[ItemProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn tally(report: &mut BatchReport, outcome: ItemOutcome) {
    match outcome {
        ItemOutcome::Decided { action, .. } => {
            report.decided += 1;
            match action {
                Action::Store => report.stored += 1,
                Action::Surface => report.surfaced += 1,
                Action::Discard => report.discarded += 1,
            }
        }
        ItemOutcome::AlreadyDecided { .. } | ItemOutcome::Busy => report.skipped += 1,
        ItemOutcome::Errored => report.errored += 1,
        ItemOutcome::Cancelled => report.cancelled += 1,
    }
}
