//! rule_weights and calibration_checkpoint.

use rusqlite::{params, Connection, OptionalExtension};

use triage_core::errors::TriageResult;
use triage_core::models::RuleWeight;

use crate::{format_ts, parse_ts, to_storage_err};

pub fn load_all(conn: &Connection) -> TriageResult<Vec<RuleWeight>> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT rule_id, weight, reinforcement_count, provenance, updated_at
             FROM rule_weights ORDER BY rule_id",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let (rule_id, weight, count, provenance, updated_at) =
            row.map_err(|e| to_storage_err(e.to_string()))?;
        out.push(RuleWeight {
            rule_id,
            weight,
            reinforcement_count: count as u64,
            provenance: serde_json::from_str(&provenance)?,
            updated_at: parse_ts(&updated_at)?,
        });
    }
    Ok(out)
}

pub fn upsert(conn: &Connection, weight: &RuleWeight) -> TriageResult<()> {
    conn.execute(
        "INSERT INTO rule_weights (rule_id, weight, reinforcement_count, provenance, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(rule_id) DO UPDATE SET
            weight = excluded.weight,
            reinforcement_count = excluded.reinforcement_count,
            provenance = excluded.provenance,
            updated_at = excluded.updated_at",
        params![
            weight.rule_id,
            weight.weight,
            weight.reinforcement_count as i64,
            serde_json::to_string(&weight.provenance)?,
            format_ts(&weight.updated_at),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn checkpoint(conn: &Connection) -> TriageResult<u64> {
    let seq: Option<i64> = conn
        .query_row(
            "SELECT last_seq FROM calibration_checkpoint WHERE id = 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(seq.unwrap_or(0) as u64)
}

pub fn set_checkpoint(conn: &Connection, seq: u64) -> TriageResult<()> {
    conn.execute(
        "INSERT INTO calibration_checkpoint (id, last_seq, updated_at) VALUES (1, ?1, ?2)
         ON CONFLICT(id) DO UPDATE SET last_seq = excluded.last_seq, updated_at = excluded.updated_at",
        params![seq as i64, format_ts(&chrono::Utc::now())],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn reset(conn: &Connection, rule_id: Option<&str>) -> TriageResult<usize> {
    let removed = match rule_id {
        Some(id) => conn.execute("DELETE FROM rule_weights WHERE rule_id = ?1", params![id]),
        None => conn.execute("DELETE FROM rule_weights", []),
    }
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(removed)
}
