//! TriageRuntime: the operational surface over storage, rules, pipeline and
//! calibrator.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use triage_core::config::TriageConfig;
use triage_core::errors::{CalibrationError, PipelineError, TriageError, TriageResult};
use triage_core::models::{
    BatchReport, CalibrationReport, CorrectionEvent, CorrectionKind, DecisionLogEntry, ErrorKind,
    ErrorRecord, ExecutionStatus, LogRecord, RuleWeight,
};
use triage_core::traits::{ICalibrationStore, IDecisionLog, IItemSource};
use triage_learning::ConfidenceCalibrator;
use triage_observability::tracing_setup::events;
use triage_observability::{calibration_span, rules_reload_span, ErrorChannel};
use triage_rules::{RuleStore, RuleTable};
use triage_storage::StorageEngine;

use crate::coordinator::{AssessorFactory, PipelineCoordinator};
use crate::executor::{ExecutorRouter, RetrySummary};
use crate::{blocking, report_error};

/// Where the rule document lives. Weight resets rebuild from here.
#[derive(Debug, Clone)]
pub enum RuleSource {
    File(PathBuf),
    Inline(String),
}

impl RuleSource {
    fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Inline(_) => "<inline>".to_string(),
        }
    }

    fn publish(&self, rules: &RuleStore, weights: &[RuleWeight]) -> TriageResult<u64> {
        let version = match self {
            Self::File(path) => rules.reload(path, weights)?,
            Self::Inline(text) => rules.reload_from_str(text, weights)?,
        };
        Ok(version)
    }
}

pub struct TriageRuntime {
    config: TriageConfig,
    storage: Arc<StorageEngine>,
    rules: Arc<RuleStore>,
    rule_source: Mutex<RuleSource>,
    coordinator: Arc<PipelineCoordinator>,
    calibrator: Arc<ConfidenceCalibrator>,
    errors: ErrorChannel,
    shutdown: CancellationToken,
}

impl TriageRuntime {
    /// Open storage at `config.storage.db_path` and load the rule document at
    /// `config.pipeline.rules_path` with persisted weights laid over it.
    /// A bad rule document refuses startup.
    pub async fn open(
        config: TriageConfig,
        source: Arc<dyn IItemSource>,
        executors: ExecutorRouter,
    ) -> TriageResult<Self> {
        let storage_config = config.storage.clone();
        let storage = blocking(move || {
            StorageEngine::open_with(Path::new(&storage_config.db_path), &storage_config)
        })
        .await?;
        let storage = Arc::new(storage);

        let rule_source = RuleSource::File(PathBuf::from(&config.pipeline.rules_path));
        let rules = {
            let storage = Arc::clone(&storage);
            let rule_source = rule_source.clone();
            blocking(move || load_rules(&storage, &rule_source)).await
        };
        let rules = match rules {
            Ok(rules) => rules,
            Err(e) => {
                let errors = ErrorChannel::new(storage.clone());
                report_error(
                    &errors,
                    ErrorRecord::new(ErrorKind::RuleParse, None, e.to_string()),
                )
                .await;
                return Err(e);
            }
        };

        Self::from_parts(config, storage, Arc::new(rules), rule_source, source, executors, None)
    }

    /// Assemble from already-open parts. Performs no storage access.
    pub fn from_parts(
        config: TriageConfig,
        storage: Arc<StorageEngine>,
        rules: Arc<RuleStore>,
        rule_source: RuleSource,
        source: Arc<dyn IItemSource>,
        executors: ExecutorRouter,
        assessors: Option<AssessorFactory>,
    ) -> TriageResult<Self> {
        let errors = ErrorChannel::new(storage.clone());
        let mut coordinator = PipelineCoordinator::new(
            source,
            storage.clone(),
            Arc::clone(&rules),
            errors.clone(),
            &config,
        )?
        .with_executors(executors);
        if let Some(factory) = assessors {
            coordinator = coordinator.with_assessors(factory);
        }
        let calibrator = ConfidenceCalibrator::new(
            storage.clone(),
            storage.clone(),
            config.calibration.clone(),
            config.routing.provenance_cap,
        );

        Ok(Self {
            config,
            storage,
            rules,
            rule_source: Mutex::new(rule_source),
            coordinator: Arc::new(coordinator),
            calibrator: Arc::new(calibrator),
            errors,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<StorageEngine> {
        &self.storage
    }

    pub fn rules(&self) -> &Arc<RuleStore> {
        &self.rules
    }

    pub fn errors(&self) -> &ErrorChannel {
        &self.errors
    }

    pub fn coordinator(&self) -> &Arc<PipelineCoordinator> {
        &self.coordinator
    }

    /// Cancel every in-flight evaluation started through this runtime.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Process a bounded batch (`batch_limit` when `limit` is None).
    pub async fn process_batch(&self, limit: Option<usize>) -> TriageResult<BatchReport> {
        let token = self.shutdown.child_token();
        self.process_batch_with_cancel(limit, &token).await
    }

    pub async fn process_batch_with_cancel(
        &self,
        limit: Option<usize>,
        cancel: &CancellationToken,
    ) -> TriageResult<BatchReport> {
        let limit = limit.unwrap_or(self.config.pipeline.batch_limit);
        self.coordinator.process_batch(limit, cancel).await
    }

    /// One calibration pass. Failures are recorded on the error stream; the
    /// checkpoint stays where it was.
    pub async fn run_calibration(&self) -> TriageResult<CalibrationReport> {
        let calibrator = Arc::clone(&self.calibrator);
        let rules = Arc::clone(&self.rules);
        let checkpoint = {
            let storage = Arc::clone(&self.storage);
            blocking(move || storage.checkpoint()).await.unwrap_or_default()
        };

        let result = blocking(move || calibrator.recalibrate(&rules))
            .instrument(calibration_span!(checkpoint))
            .await;
        match &result {
            Ok(report) => events::calibration_completed(
                report.from_checkpoint,
                report.to_checkpoint,
                report.deltas.len(),
                report.rule_set_version,
            ),
            Err(TriageError::CalibrationError(CalibrationError::AlreadyRunning)) => {
                tracing::info!("calibration already running, request ignored");
            }
            Err(TriageError::CalibrationError(CalibrationError::Stale { expected, found })) => {
                tracing::info!(
                    expected,
                    found,
                    "window consumed by another calibrator, nothing committed"
                );
            }
            Err(e) => {
                report_error(
                    &self.errors,
                    ErrorRecord::new(ErrorKind::CalibrationFailure, None, e.to_string()),
                )
                .await;
            }
        }
        result
    }

    /// Re-read the rule document (from `path` when given, which then becomes
    /// the document used from now on). A bad document is reported and the
    /// last good table keeps serving.
    pub async fn reload_rules(&self, path: Option<&Path>) -> TriageResult<u64> {
        let source = match path {
            Some(p) => RuleSource::File(p.to_path_buf()),
            None => self.current_rule_source()?,
        };
        let span = rules_reload_span!(source.describe());

        let storage = Arc::clone(&self.storage);
        let rules = Arc::clone(&self.rules);
        let attempt = source.clone();
        let result = blocking(move || {
            let weights = storage.load_weights()?;
            attempt.publish(&rules, &weights)
        })
        .instrument(span)
        .await;

        match result {
            Ok(version) => {
                let table = self.rules.snapshot()?;
                events::rules_reloaded(version, table.rules().len(), table.document_hash());
                if let Ok(mut current) = self.rule_source.lock() {
                    *current = source;
                }
                Ok(version)
            }
            Err(e) => {
                report_error(
                    &self.errors,
                    ErrorRecord::new(
                        ErrorKind::RuleParse,
                        None,
                        format!("{}: {e}", source.describe()),
                    ),
                )
                .await;
                Err(e)
            }
        }
    }

    /// Append human feedback on the decision logged at `seq`.
    pub async fn record_correction(&self, seq: u64, kind: CorrectionKind) -> TriageResult<u64> {
        let storage = Arc::clone(&self.storage);
        blocking(move || {
            let decision = storage
                .decision_at(seq)?
                .ok_or(PipelineError::DecisionNotFound { seq })?;
            let event = CorrectionEvent::for_decision(seq, &decision, kind);
            storage.append(&LogRecord::Correction(event))
        })
        .await
    }

    pub async fn read_log(&self, from_seq: u64, limit: usize) -> TriageResult<Vec<DecisionLogEntry>> {
        let storage = Arc::clone(&self.storage);
        blocking(move || storage.read(from_seq, limit)).await
    }

    /// Drop calibrated overlays (all when `rule_id` is None) and republish
    /// the document weights for the affected rules.
    pub async fn reset_weights(&self, rule_id: Option<String>) -> TriageResult<usize> {
        let source = self.current_rule_source()?;
        let storage = Arc::clone(&self.storage);
        let rules = Arc::clone(&self.rules);
        let removed = blocking(move || {
            let removed = storage.reset_weights(rule_id.as_deref())?;
            let remaining = storage.load_weights()?;
            source.publish(&rules, &remaining)?;
            Ok(removed)
        })
        .await?;
        tracing::info!(removed, "calibrated weights reset");
        Ok(removed)
    }

    /// Re-execute logged decisions whose execution is still owed.
    pub async fn retry_deferred(&self, limit: Option<usize>) -> TriageResult<RetrySummary> {
        let limit = limit.unwrap_or(self.config.pipeline.batch_limit);
        let storage = Arc::clone(&self.storage);
        let pending = blocking(move || storage.pending_executions(limit)).await?;

        let mut summary = RetrySummary::default();
        for (seq, decision) in pending {
            let source = Arc::clone(self.coordinator.source());
            let item_id = decision.item_id.clone();
            let Some(item) = blocking(move || source.item(&item_id)).await? else {
                summary.unavailable += 1;
                report_error(
                    &self.errors,
                    ErrorRecord::new(
                        ErrorKind::ExecutionFailure,
                        Some(&decision.item_id),
                        format!("item for seq {seq} is no longer in the inbox"),
                    ),
                )
                .await;
                continue;
            };
            match self.coordinator.execute_logged(seq, &decision, &item).await {
                Some(status) => {
                    summary.attempted += 1;
                    match status {
                        ExecutionStatus::Succeeded => summary.succeeded += 1,
                        ExecutionStatus::Deferred => summary.deferred += 1,
                        ExecutionStatus::Rejected => summary.rejected += 1,
                    }
                }
                None => summary.unavailable += 1,
            }
        }
        Ok(summary)
    }

    /// Validate a rule document without installing it.
    pub fn check_rules(path: &Path) -> TriageResult<RuleTable> {
        Ok(RuleTable::load(path)?)
    }

    fn current_rule_source(&self) -> TriageResult<RuleSource> {
        self.rule_source
            .lock()
            .map(|s| s.clone())
            .map_err(|_| TriageError::ConcurrencyError("rule source lock poisoned".to_string()))
    }
}

fn load_rules(storage: &StorageEngine, source: &RuleSource) -> TriageResult<RuleStore> {
    let table = match source {
        RuleSource::File(path) => RuleTable::load(path)?,
        RuleSource::Inline(text) => RuleTable::parse(text)?,
    };
    let weights = storage.load_weights()?;
    Ok(RuleStore::new(table.with_weights(&weights)))
}
