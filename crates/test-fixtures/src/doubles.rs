//! Scripted doubles for the trait seams.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use triage_core::constants::{EXCITEMENT_ASSESSOR, ROUTING_ASSESSOR, URGENCY_ASSESSOR};
use triage_core::errors::{ExecutionError, StorageError, TriageResult};
use triage_core::models::{
    Assessment, AssessmentPayload, AssessorOutcome, Decision, DecisionLogEntry, DestinationKind,
    ErrorRecord, Item, LogRecord, Mode, UrgencyLevel,
};
use triage_core::traits::{
    ExecutionReceipt, ExecutionRequest, IActionExecutor, IAssessor, IDecisionLog, IErrorSink,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Zero-confidence payload matching an assessor name.
pub fn fallback_payload(assessor: &str) -> AssessmentPayload {
    match assessor {
        ROUTING_ASSESSOR => AssessmentPayload::Routing {
            destination: None,
            destination_kind: None,
            rule_id: None,
            matched: 0,
        },
        URGENCY_ASSESSOR => AssessmentPayload::Urgency {
            level: UrgencyLevel::Whenever,
            signals: Vec::new(),
        },
        EXCITEMENT_ASSESSOR => AssessmentPayload::Excitement { score: 0.0 },
        _ => AssessmentPayload::Custom {
            data: serde_json::Value::Null,
        },
    }
}

/// Assessor that returns a fixed outcome, optionally after sleeping or panicking.
pub struct ScriptedAssessor {
    name: String,
    required: Vec<Mode>,
    outcome: AssessorOutcome,
    delay: Duration,
    panics: bool,
    calls: AtomicUsize,
}

impl ScriptedAssessor {
    pub fn new(name: &str, outcome: AssessorOutcome) -> Self {
        Self {
            name: name.to_string(),
            required: vec![Mode::Backfill, Mode::Live],
            outcome,
            delay: Duration::ZERO,
            panics: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn assessed(assessment: Assessment) -> Self {
        Self::new(&assessment.assessor.clone(), AssessorOutcome::Assessed(assessment))
    }

    pub fn required_in_modes(mut self, modes: &[Mode]) -> Self {
        self.required = modes.to_vec();
        self
    }

    /// Sleep before answering (blocks the worker thread, like a slow strategy).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panics = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IAssessor for ScriptedAssessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_in(&self, mode: Mode) -> bool {
        self.required.contains(&mode)
    }

    fn evaluate(&self, _item: &Item, _mode: Mode) -> AssessorOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if self.panics {
            panic!("scripted assessor '{}' panicked", self.name);
        }
        self.outcome.clone()
    }

    fn fallback(&self, mode: Mode, rationale: &str) -> Assessment {
        Assessment::new(
            self.name.clone(),
            mode,
            fallback_payload(&self.name),
            0.0,
            rationale,
        )
    }
}

/// Executor that records requests and replays scripted results (default: success).
pub struct RecordingExecutor {
    kinds: Vec<DestinationKind>,
    script: Mutex<VecDeque<Result<ExecutionReceipt, ExecutionError>>>,
    requests: Mutex<Vec<ExecutionRequest>>,
}

impl RecordingExecutor {
    pub fn new(kinds: &[DestinationKind]) -> Self {
        Self {
            kinds: kinds.to_vec(),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue results for the next calls, in order.
    pub fn then(self, result: Result<ExecutionReceipt, ExecutionError>) -> Self {
        lock(&self.script).push_back(result);
        self
    }

    pub fn requests(&self) -> Vec<ExecutionRequest> {
        lock(&self.requests).clone()
    }
}

impl IActionExecutor for RecordingExecutor {
    fn kinds(&self) -> &[DestinationKind] {
        &self.kinds
    }

    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReceipt, ExecutionError> {
        lock(&self.requests).push(request.clone());
        lock(&self.script).pop_front().unwrap_or_else(|| {
            Ok(ExecutionReceipt {
                location: request.destination.clone().unwrap_or_default(),
            })
        })
    }
}

/// In-memory error sink; can be told to fail.
#[derive(Default)]
pub struct MemoryErrorSink {
    records: Mutex<Vec<ErrorRecord>>,
    failing: AtomicBool,
}

impl MemoryErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<ErrorRecord> {
        lock(&self.records).clone()
    }
}

impl IErrorSink for MemoryErrorSink {
    fn record(&self, record: &ErrorRecord) -> TriageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::SqliteError {
                message: "error sink unavailable".into(),
            }
            .into());
        }
        lock(&self.records).push(record.clone());
        Ok(())
    }
}

/// Wraps a real log; appends fail while the switch is on.
pub struct FlakyDecisionLog {
    inner: Arc<dyn IDecisionLog>,
    fail_appends: AtomicBool,
}

impl FlakyDecisionLog {
    pub fn new(inner: Arc<dyn IDecisionLog>) -> Self {
        Self {
            inner,
            fail_appends: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_appends.store(failing, Ordering::SeqCst);
    }
}

impl IDecisionLog for FlakyDecisionLog {
    fn append(&self, record: &LogRecord) -> TriageResult<u64> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StorageError::AppendFailed {
                reason: "disk full".into(),
            }
            .into());
        }
        self.inner.append(record)
    }

    fn read(&self, from_seq: u64, limit: usize) -> TriageResult<Vec<DecisionLogEntry>> {
        self.inner.read(from_seq, limit)
    }

    fn last_seq(&self) -> TriageResult<u64> {
        self.inner.last_seq()
    }

    fn latest_decision_for(&self, item_id: &str) -> TriageResult<Option<(u64, Decision)>> {
        self.inner.latest_decision_for(item_id)
    }
}

/// Vector-backed decision log. Never blocks, so it is safe to call from
/// async tests directly.
#[derive(Default)]
pub struct MemoryDecisionLog {
    entries: Mutex<Vec<DecisionLogEntry>>,
}

impl MemoryDecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<DecisionLogEntry> {
        lock(&self.entries).clone()
    }

    pub fn decisions(&self) -> Vec<Decision> {
        lock(&self.entries)
            .iter()
            .filter_map(|e| e.record.as_decision().cloned())
            .collect()
    }
}

impl IDecisionLog for MemoryDecisionLog {
    fn append(&self, record: &LogRecord) -> TriageResult<u64> {
        let mut entries = lock(&self.entries);
        let seq = entries.len() as u64 + 1;
        entries.push(DecisionLogEntry {
            seq,
            outcome: record.planned_outcome(),
            record: record.clone(),
            appended_at: chrono::Utc::now(),
        });
        Ok(seq)
    }

    fn read(&self, from_seq: u64, limit: usize) -> TriageResult<Vec<DecisionLogEntry>> {
        Ok(lock(&self.entries)
            .iter()
            .filter(|e| e.seq >= from_seq)
            .take(limit)
            .cloned()
            .collect())
    }

    fn last_seq(&self) -> TriageResult<u64> {
        Ok(lock(&self.entries).len() as u64)
    }

    fn latest_decision_for(&self, item_id: &str) -> TriageResult<Option<(u64, Decision)>> {
        Ok(lock(&self.entries).iter().rev().find_map(|e| match &e.record {
            LogRecord::Decision(d) if d.item_id == item_id => Some((e.seq, d.clone())),
            _ => None,
        }))
    }
}
