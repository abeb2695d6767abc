//! v002: error_records.

use rusqlite::Connection;

use triage_core::errors::TriageResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> TriageResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS error_records (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            item_id     TEXT,
            kind        TEXT NOT NULL,
            context     TEXT NOT NULL,
            timestamp   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_errors_kind ON error_records(kind);
        CREATE INDEX IF NOT EXISTS idx_errors_item ON error_records(item_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
