//! v003: rule_weights overlay, calibration_checkpoint singleton.

use rusqlite::Connection;

use triage_core::errors::TriageResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> TriageResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS rule_weights (
            rule_id              TEXT PRIMARY KEY,
            weight               REAL NOT NULL CHECK (weight >= 0.0 AND weight <= 1.0),
            reinforcement_count  INTEGER NOT NULL DEFAULT 0,
            provenance           TEXT NOT NULL DEFAULT '[]',
            updated_at           TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS calibration_checkpoint (
            id          INTEGER PRIMARY KEY CHECK (id = 1),
            last_seq    INTEGER NOT NULL,
            updated_at  TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
