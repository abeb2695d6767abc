//! ConfidenceCalibrator: reads the log window after the checkpoint, folds it
//! into weight updates, commits them atomically and publishes a new rule table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use triage_core::config::CalibrationConfig;
use triage_core::errors::{CalibrationError, TriageError, TriageResult};
use triage_core::models::{CalibrationReport, RuleWeight};
use triage_core::traits::{ICalibrationStore, IDecisionLog};
use triage_rules::RuleStore;

use crate::window::fold_window;

/// Batch calibrator. At most one run at a time per instance.
pub struct ConfidenceCalibrator {
    log: Arc<dyn IDecisionLog>,
    store: Arc<dyn ICalibrationStore>,
    config: CalibrationConfig,
    provenance_cap: usize,
    running: AtomicBool,
}

/// Clears the running flag when a run ends, however it ends.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ConfidenceCalibrator {
    pub fn new(
        log: Arc<dyn IDecisionLog>,
        store: Arc<dyn ICalibrationStore>,
        config: CalibrationConfig,
        provenance_cap: usize,
    ) -> Self {
        Self {
            log,
            store,
            config,
            provenance_cap,
            running: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Consume up to `max_window` entries after the checkpoint.
    ///
    /// Weights and the new checkpoint are committed together; on a failed
    /// commit neither moves and the same window is reprocessed next run.
    /// A second call while one is in flight fails with `AlreadyRunning`; a
    /// run whose window another calibrator committed first fails with `Stale`.
    pub fn recalibrate(&self, rules: &RuleStore) -> TriageResult<CalibrationReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CalibrationError::AlreadyRunning.into());
        }
        let _guard = RunGuard(&self.running);

        let from_checkpoint = self.store.checkpoint()?;
        let entries = self
            .log
            .read(from_checkpoint + 1, self.config.max_window)
            .map_err(read_failed)?;

        if entries.is_empty() {
            tracing::debug!(checkpoint = from_checkpoint, "calibration window empty");
            return Ok(CalibrationReport {
                from_checkpoint,
                to_checkpoint: from_checkpoint,
                ..Default::default()
            });
        }

        let table = rules.snapshot()?;
        let persisted: HashMap<String, RuleWeight> = self
            .store
            .load_weights()?
            .into_iter()
            .map(|w| (w.rule_id.clone(), w))
            .collect();

        let outcome = fold_window(
            &entries,
            |rule_id| {
                let rule = table.rule(rule_id)?;
                Some(
                    persisted
                        .get(rule_id)
                        .cloned()
                        .unwrap_or_else(|| RuleWeight::from_rule(&rule.rule)),
                )
            },
            self.config.alpha,
            self.provenance_cap,
        );

        let to_checkpoint = outcome.last_seq.unwrap_or(from_checkpoint);
        let updated: Vec<RuleWeight> = outcome.weights.into_values().collect();
        self.store
            .commit_calibration(&updated, from_checkpoint, to_checkpoint)?;

        let rule_set_version = if updated.is_empty() {
            None
        } else {
            self.publish(rules)
        };

        tracing::info!(
            from_checkpoint,
            to_checkpoint,
            entries = entries.len(),
            rules_updated = updated.len(),
            ?rule_set_version,
            "calibration completed"
        );

        Ok(CalibrationReport {
            from_checkpoint,
            to_checkpoint,
            entries_scanned: entries.len(),
            deltas: outcome.deltas,
            rule_set_version,
        })
    }

    /// Lay every persisted overlay on the live table. The weights are already
    /// durable, so a failure here only delays their use until the next reload.
    fn publish(&self, rules: &RuleStore) -> Option<u64> {
        let overlays = match self.store.load_weights() {
            Ok(overlays) => overlays,
            Err(e) => {
                tracing::warn!(error = %e, "committed weights could not be re-read for publish");
                return None;
            }
        };
        match rules.apply_weights(&overlays) {
            Ok(version) => Some(version),
            Err(e) => {
                tracing::warn!(error = %e, "calibrated weights not published");
                None
            }
        }
    }
}

fn read_failed(e: TriageError) -> TriageError {
    CalibrationError::ReadFailed {
        reason: e.to_string(),
    }
    .into()
}
