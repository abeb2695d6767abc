//! StorageEngine: owns the ConnectionPool and implements IDecisionLog,
//! IErrorSink and ICalibrationStore.

use std::path::Path;

use rusqlite::{Transaction, TransactionBehavior};

use triage_core::config::StorageConfig;
use triage_core::errors::{CalibrationError, TriageResult};
use triage_core::models::{
    Decision, DecisionLogEntry, ErrorKind, ErrorRecord, LogRecord, RuleWeight,
};
use triage_core::traits::{ICalibrationStore, IDecisionLog, IErrorSink};

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::{error_ops, log_ops, weight_ops};

/// SQLite-backed storage for the decision log, error stream and weights.
///
/// All methods are synchronous. Async callers must run them on a blocking
/// thread (`tokio::task::spawn_blocking`), since the write connection uses
/// `blocking_lock`.
pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> TriageResult<Self> {
        Self::open_with(path, &StorageConfig::default())
    }

    /// Open with explicit pool settings.
    pub fn open_with(path: &Path, config: &StorageConfig) -> TriageResult<Self> {
        let pool = ConnectionPool::open(path, config.read_pool_size, config.busy_timeout_ms)?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine (for testing).
    pub fn open_in_memory() -> TriageResult<Self> {
        let engine = Self {
            pool: ConnectionPool::open_in_memory()?,
        };
        engine.initialize()?;
        Ok(engine)
    }

    fn initialize(&self) -> TriageResult<()> {
        self.pool.writer.with_conn_sync(|conn| {
            let applied = migrations::run_migrations(conn)?;
            if applied > 0 {
                tracing::info!(applied, "storage schema migrated");
            }
            Ok(())
        })
    }

    /// Get a reference to the connection pool (for advanced operations).
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Schema version currently applied.
    pub fn schema_version(&self) -> TriageResult<u32> {
        self.with_reader(migrations::current_version)
    }

    /// File-backed: read pool. In-memory: the writer, since a second
    /// in-memory connection would be a different database.
    fn with_reader<F, T>(&self, f: F) -> TriageResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> TriageResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.with_conn(f),
            None => self.pool.writer.with_conn_sync(f),
        }
    }

    /// Every log entry concerning one item, oldest first.
    pub fn entries_for_item(&self, item_id: &str) -> TriageResult<Vec<DecisionLogEntry>> {
        self.with_reader(|conn| log_ops::entries_for_item(conn, item_id))
    }

    /// The decision logged at `seq`, if that entry is a decision.
    pub fn decision_at(&self, seq: u64) -> TriageResult<Option<Decision>> {
        self.with_reader(|conn| log_ops::decision_at(conn, seq))
    }

    /// Decisions whose execution is still owed, oldest first.
    pub fn pending_executions(&self, limit: usize) -> TriageResult<Vec<(u64, Decision)>> {
        self.with_reader(|conn| log_ops::pending_executions(conn, limit))
    }

    /// Entry counts per record type.
    pub fn log_counts(&self) -> TriageResult<Vec<(String, u64)>> {
        self.with_reader(log_ops::count_by_type)
    }

    /// Most recent error records, newest first.
    pub fn recent_errors(&self, limit: usize) -> TriageResult<Vec<ErrorRecord>> {
        self.with_reader(|conn| error_ops::recent(conn, limit))
    }

    pub fn error_count(&self, kind: ErrorKind) -> TriageResult<u64> {
        self.with_reader(|conn| error_ops::count_by_kind(conn, kind))
    }
}

impl IDecisionLog for StorageEngine {
    fn append(&self, record: &LogRecord) -> TriageResult<u64> {
        self.pool
            .writer
            .with_conn_sync(|conn| log_ops::append(conn, record))
    }

    fn read(&self, from_seq: u64, limit: usize) -> TriageResult<Vec<DecisionLogEntry>> {
        self.with_reader(|conn| log_ops::read_from(conn, from_seq, limit))
    }

    fn last_seq(&self) -> TriageResult<u64> {
        self.with_reader(log_ops::last_seq)
    }

    fn latest_decision_for(&self, item_id: &str) -> TriageResult<Option<(u64, Decision)>> {
        self.with_reader(|conn| log_ops::latest_decision_for(conn, item_id))
    }
}

impl IErrorSink for StorageEngine {
    fn record(&self, record: &ErrorRecord) -> TriageResult<()> {
        self.pool
            .writer
            .with_conn_sync(|conn| error_ops::insert(conn, record))
    }
}

impl ICalibrationStore for StorageEngine {
    fn load_weights(&self) -> TriageResult<Vec<RuleWeight>> {
        self.with_reader(weight_ops::load_all)
    }

    fn checkpoint(&self) -> TriageResult<u64> {
        self.with_reader(weight_ops::checkpoint)
    }

    fn commit_calibration(
        &self,
        weights: &[RuleWeight],
        from_checkpoint: u64,
        to_checkpoint: u64,
    ) -> TriageResult<()> {
        if to_checkpoint < from_checkpoint {
            return Err(commit_err(format!(
                "checkpoint would move backwards ({from_checkpoint} -> {to_checkpoint})"
            )));
        }
        self.pool.writer.with_conn_sync(|conn| {
            // IMMEDIATE takes the database write lock before the checkpoint is
            // read, so calibrators in other processes serialize here too.
            let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
                .map_err(|e| commit_err(e.to_string()))?;
            let current = weight_ops::checkpoint(&tx)?;
            if current != from_checkpoint {
                return Err(CalibrationError::Stale {
                    expected: from_checkpoint,
                    found: current,
                }
                .into());
            }
            for weight in weights {
                weight_ops::upsert(&tx, weight)?;
            }
            weight_ops::set_checkpoint(&tx, to_checkpoint)?;
            tx.commit().map_err(|e| commit_err(e.to_string()))?;
            Ok(())
        })
    }

    fn reset_weights(&self, rule_id: Option<&str>) -> TriageResult<usize> {
        self.pool
            .writer
            .with_conn_sync(|conn| weight_ops::reset(conn, rule_id))
    }
}

fn commit_err(reason: String) -> triage_core::TriageError {
    CalibrationError::CommitFailed { reason }.into()
}
