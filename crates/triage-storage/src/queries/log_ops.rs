//! decision_log: append, ordered reads, per-item lookups, pending executions.

use rusqlite::{params, Connection, OptionalExtension};

use triage_core::errors::{StorageError, TriageResult};
use triage_core::models::{
    Decision, DecisionLogEntry, ExecutionStatus, LogRecord, PlannedOutcome,
};

use super::sql_limit;
use crate::{format_ts, parse_ts, to_storage_err};

fn status_str(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Succeeded => "succeeded",
        ExecutionStatus::Deferred => "deferred",
        ExecutionStatus::Rejected => "rejected",
    }
}

/// Append one record. Returns the assigned sequence number.
pub fn append(conn: &Connection, record: &LogRecord) -> TriageResult<u64> {
    let payload = serde_json::to_string(record)?;
    let outcome = record
        .planned_outcome()
        .map(|o| serde_json::to_string(&o))
        .transpose()?;

    let (ref_seq, action, status) = match record {
        LogRecord::Decision(d) => (None, Some(d.action.as_str()), None),
        LogRecord::Execution(e) => (
            Some(e.decision_seq as i64),
            Some(e.action.as_str()),
            Some(status_str(e.status)),
        ),
        LogRecord::Correction(c) => (
            Some(c.corrects_seq as i64),
            Some(c.original_action.as_str()),
            None,
        ),
    };

    conn.execute(
        "INSERT INTO decision_log
            (item_id, record_type, ref_seq, action, status, payload, outcome, appended_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.item_id(),
            record.kind(),
            ref_seq,
            action,
            status,
            payload,
            outcome,
            format_ts(&chrono::Utc::now()),
        ],
    )
    .map_err(|e| {
        triage_core::TriageError::from(StorageError::AppendFailed {
            reason: e.to_string(),
        })
    })?;

    Ok(conn.last_insert_rowid() as u64)
}

/// Entries with `seq >= from_seq`, ascending, at most `limit`.
pub fn read_from(conn: &Connection, from_seq: u64, limit: usize) -> TriageResult<Vec<DecisionLogEntry>> {
    // Sequence numbers are SQLite rowids, so nothing lies past i64::MAX.
    let Ok(from_seq) = i64::try_from(from_seq) else {
        return Ok(Vec::new());
    };
    let mut stmt = conn
        .prepare_cached(
            "SELECT seq, payload, outcome, appended_at FROM decision_log
             WHERE seq >= ?1 ORDER BY seq ASC LIMIT ?2",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![from_seq, sql_limit(limit)], raw_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_entries(rows)
}

/// Every entry concerning one item, ascending.
pub fn entries_for_item(conn: &Connection, item_id: &str) -> TriageResult<Vec<DecisionLogEntry>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT seq, payload, outcome, appended_at FROM decision_log
             WHERE item_id = ?1 ORDER BY seq ASC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![item_id], raw_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    collect_entries(rows)
}

/// Highest sequence number, 0 for an empty log.
pub fn last_seq(conn: &Connection) -> TriageResult<u64> {
    let seq: Option<i64> = conn
        .query_row("SELECT MAX(seq) FROM decision_log", [], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(seq.unwrap_or(0) as u64)
}

/// Number of entries of each record type.
pub fn count_by_type(conn: &Connection) -> TriageResult<Vec<(String, u64)>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT record_type, COUNT(*) FROM decision_log GROUP BY record_type ORDER BY record_type",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64)))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// The most recent decision for an item.
pub fn latest_decision_for(conn: &Connection, item_id: &str) -> TriageResult<Option<(u64, Decision)>> {
    let row = conn
        .query_row(
            "SELECT seq, payload FROM decision_log
             WHERE item_id = ?1 AND record_type = 'decision'
             ORDER BY seq DESC LIMIT 1",
            params![item_id],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    row.map(|(seq, payload)| decode_decision(seq as u64, &payload))
        .transpose()
}

/// The decision logged at `seq`, if that entry is a decision.
pub fn decision_at(conn: &Connection, seq: u64) -> TriageResult<Option<Decision>> {
    let Ok(row_seq) = i64::try_from(seq) else {
        return Ok(None);
    };
    let payload: Option<String> = conn
        .query_row(
            "SELECT payload FROM decision_log WHERE seq = ?1 AND record_type = 'decision'",
            params![row_seq],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    payload
        .map(|p| decode_decision(seq, &p).map(|(_, d)| d))
        .transpose()
}

/// Decisions whose execution is still owed: the item's latest decision is a
/// store with no execution entry at all, or a store/surface whose attempts
/// were deferred and never later succeeded or rejected.
pub fn pending_executions(conn: &Connection, limit: usize) -> TriageResult<Vec<(u64, Decision)>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT d.seq, d.payload FROM decision_log d
             WHERE d.record_type = 'decision'
               AND d.action IN ('store', 'surface')
               AND d.seq = (SELECT MAX(x.seq) FROM decision_log x
                            WHERE x.item_id = d.item_id AND x.record_type = 'decision')
               AND NOT EXISTS (SELECT 1 FROM decision_log e
                               WHERE e.record_type = 'execution' AND e.ref_seq = d.seq
                                 AND e.status IN ('succeeded', 'rejected'))
               AND (
                    (d.action = 'store' AND NOT EXISTS (
                        SELECT 1 FROM decision_log e WHERE e.record_type = 'execution' AND e.ref_seq = d.seq))
                    OR EXISTS (
                        SELECT 1 FROM decision_log e
                        WHERE e.record_type = 'execution' AND e.ref_seq = d.seq AND e.status = 'deferred')
               )
             ORDER BY d.seq ASC LIMIT ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![sql_limit(limit)], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (seq, payload) = row.map_err(|e| to_storage_err(e.to_string()))?;
        out.push(decode_decision(seq as u64, &payload)?);
    }
    Ok(out)
}

type RawRow = (i64, String, Option<String>, String);

fn raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn collect_entries(
    rows: impl Iterator<Item = rusqlite::Result<RawRow>>,
) -> TriageResult<Vec<DecisionLogEntry>> {
    let mut entries = Vec::new();
    for row in rows {
        let (seq, payload, outcome, appended_at) = row.map_err(|e| to_storage_err(e.to_string()))?;
        entries.push(decode_entry(seq as u64, &payload, outcome.as_deref(), &appended_at)?);
    }
    Ok(entries)
}

fn decode_entry(
    seq: u64,
    payload: &str,
    outcome: Option<&str>,
    appended_at: &str,
) -> TriageResult<DecisionLogEntry> {
    let record: LogRecord = serde_json::from_str(payload).map_err(|e| corrupt(seq, e))?;
    let outcome: Option<PlannedOutcome> = outcome
        .map(serde_json::from_str)
        .transpose()
        .map_err(|e| corrupt(seq, e))?;
    Ok(DecisionLogEntry {
        seq,
        record,
        outcome,
        appended_at: parse_ts(appended_at)?,
    })
}

fn decode_decision(seq: u64, payload: &str) -> TriageResult<(u64, Decision)> {
    match serde_json::from_str::<LogRecord>(payload).map_err(|e| corrupt(seq, e))? {
        LogRecord::Decision(d) => Ok((seq, d)),
        other => Err(StorageError::CorruptEntry {
            seq,
            reason: format!("expected decision payload, found {}", other.kind()),
        }
        .into()),
    }
}

fn corrupt(seq: u64, e: serde_json::Error) -> triage_core::TriageError {
    StorageError::CorruptEntry {
        seq,
        reason: e.to_string(),
    }
    .into()
}
