//! error_records: append and inspect the error stream.

use rusqlite::{params, Connection};

use triage_core::errors::TriageResult;
use triage_core::models::{ErrorKind, ErrorRecord};

use super::sql_limit;
use crate::{format_ts, parse_ts, to_storage_err};

pub fn insert(conn: &Connection, record: &ErrorRecord) -> TriageResult<()> {
    conn.execute(
        "INSERT INTO error_records (item_id, kind, context, timestamp) VALUES (?1, ?2, ?3, ?4)",
        params![
            record.item_id,
            record.kind.as_str(),
            record.context,
            format_ts(&record.timestamp),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Most recent records first.
pub fn recent(conn: &Connection, limit: usize) -> TriageResult<Vec<ErrorRecord>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT item_id, kind, context, timestamp FROM error_records
             ORDER BY id DESC LIMIT ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![sql_limit(limit)], |row| {
            Ok((
                row.get::<_, Option<String>>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (item_id, kind, context, timestamp) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let kind = ErrorKind::parse(&kind)
            .ok_or_else(|| to_storage_err(format!("unknown error kind '{kind}'")))?;
        out.push(ErrorRecord {
            item_id,
            kind,
            context,
            timestamp: parse_ts(&timestamp)?,
        });
    }
    Ok(out)
}

pub fn count_by_kind(conn: &Connection, kind: ErrorKind) -> TriageResult<u64> {
    conn.query_row(
        "SELECT COUNT(*) FROM error_records WHERE kind = ?1",
        params![kind.as_str()],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as u64)
    .map_err(|e| to_storage_err(e.to_string()))
}
