// src/db/runs.rs
use crate::db::connection::Database;
use crate::errors::ServerError;
use rusqlite::params;

/// `kind` is "snapshot" or "sync".
pub fn start_run(db: &Database, kind: &str, now: i64) -> Result<i64, ServerError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO snapshot_runs (kind, started_at, success) VALUES (?1, ?2, 0)",
            params![kind, now],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

pub fn end_run(
    db: &Database,
    run_id: i64,
    now: i64,
    rows_written: usize,
    success: bool,
    error: Option<String>,
) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE snapshot_runs SET finished_at = ?1, rows_written = ?2, success = ?3,
             error_message = ?4 WHERE id = ?5",
            params![now, rows_written as i64, success, error, run_id],
        )?;
        Ok(())
    })
}

#[derive(Debug)]
pub struct RunSummary {
    pub id: i64,
    pub kind: String,
    pub started_at: i64,
    pub finished_at: Option<i64>,
    pub rows_written: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
}

pub fn recent_runs(db: &Database, limit: usize) -> Result<Vec<RunSummary>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, kind, started_at, finished_at, rows_written, success, error_message
             FROM snapshot_runs ORDER BY started_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(RunSummary {
                id: row.get(0)?,
                kind: row.get(1)?,
                started_at: row.get(2)?,
                finished_at: row.get(3)?,
                rows_written: row.get(4)?,
                success: row.get(5)?,
                error_message: row.get(6)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(out)
    })
}
