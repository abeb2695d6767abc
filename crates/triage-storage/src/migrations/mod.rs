//! Schema migrations. The applied version lives in `PRAGMA user_version`;
//! each step runs in its own transaction and bumps the version on commit.

mod v001_decision_log;
mod v002_error_records;
mod v003_calibration;

use rusqlite::Connection;

use triage_core::errors::{StorageError, TriageResult};

use crate::to_storage_err;

type MigrationFn = fn(&Connection) -> TriageResult<()>;

const MIGRATIONS: &[(u32, MigrationFn)] = &[
    (1, v001_decision_log::migrate),
    (2, v002_error_records::migrate),
    (3, v003_calibration::migrate),
];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: u32 = 3;

/// Current schema version of a database.
pub fn current_version(conn: &Connection) -> TriageResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Apply every migration newer than the database's version.
/// Returns the number of migrations applied.
pub fn run_migrations(conn: &Connection) -> TriageResult<usize> {
    let current = current_version(conn)?;
    if current > LATEST_VERSION {
        return Err(StorageError::MigrationFailed {
            version: current,
            reason: format!("database is newer than this build (latest {LATEST_VERSION})"),
        }
        .into());
    }

    let mut applied = 0;
    for &(version, migrate) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| migration_err(version, e.to_string()))?;
        migrate(&tx).map_err(|e| migration_err(version, e.to_string()))?;
        tx.pragma_update(None, "user_version", version)
            .map_err(|e| migration_err(version, e.to_string()))?;
        tx.commit()
            .map_err(|e| migration_err(version, e.to_string()))?;
        tracing::debug!(version, "applied schema migration");
        applied += 1;
    }
    Ok(applied)
}

fn migration_err(version: u32, reason: String) -> triage_core::TriageError {
    StorageError::MigrationFailed { version, reason }.into()
}
