//! v001: decision_log with append-only enforcement.

use rusqlite::Connection;

use triage_core::errors::TriageResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> TriageResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS decision_log (
            seq          INTEGER PRIMARY KEY AUTOINCREMENT,
            item_id      TEXT NOT NULL,
            record_type  TEXT NOT NULL CHECK (record_type IN ('decision', 'execution', 'correction')),
            ref_seq      INTEGER,
            action       TEXT,
            status       TEXT,
            payload      TEXT NOT NULL,
            outcome      TEXT,
            appended_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_log_item ON decision_log(item_id, record_type);
        CREATE INDEX IF NOT EXISTS idx_log_ref ON decision_log(ref_seq);

        CREATE TRIGGER IF NOT EXISTS decision_log_no_update
        BEFORE UPDATE ON decision_log
        BEGIN
            SELECT RAISE(ABORT, 'decision_log is append-only');
        END;

        CREATE TRIGGER IF NOT EXISTS decision_log_no_delete
        BEFORE DELETE ON decision_log
        BEGIN
            SELECT RAISE(ABORT, 'decision_log is append-only');
        END;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
