//! # triage-storage
//!
//! SQLite persistence for the routing engine: the append-only decision log,
//! the error record stream, calibrated rule weights and the calibration
//! checkpoint. One serialized write connection, a read pool for file-backed
//! databases, schema migrations tracked with `PRAGMA user_version`.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use triage_core::errors::{StorageError, TriageError};

/// Wrap a SQLite failure message as a storage error.
pub(crate) fn to_storage_err(message: String) -> TriageError {
    TriageError::StorageError(StorageError::SqliteError { message })
}

/// Timestamp format used in every table.
pub(crate) fn format_ts(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(raw: &str) -> triage_core::TriageResult<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| to_storage_err(format!("bad timestamp '{raw}': {e}")))
}
