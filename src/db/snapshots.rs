// src/db/snapshots.rs
//
// Named-blob snapshot store. The store only accepts and returns text; typed
// parsing happens in the snapshot runner, never here. Column order is fixed
// for compatibility with previously exported sheets.

use crate::db::connection::Database;
use crate::errors::ServerError;
use chrono::{Datelike, NaiveDate};
use rusqlite::params;

/// Persisted column order. Changing this breaks exports of older snapshots.
pub const SNAPSHOT_COLUMNS: [&str; 17] = [
    "name",
    "cnpj",
    "seller_name",
    "recency",
    "frequency",
    "value",
    "first_purchase_date",
    "last_purchase_date",
    "snapshot_day",
    "m0_segment",
    "prev_recency",
    "prev_frequency",
    "prev_value",
    "m1_segment",
    "changed",
    "change_value",
    "message_sent",
];

/// One persisted snapshot row; all values are text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotRow {
    pub name: String,
    pub cnpj: String,
    pub seller_name: String,
    pub recency: String,
    pub frequency: String,
    pub value: String,
    pub first_purchase_date: String,
    pub last_purchase_date: String,
    pub snapshot_day: String,
    pub m0_segment: String,
    pub prev_recency: String,
    pub prev_frequency: String,
    pub prev_value: String,
    pub m1_segment: String,
    pub changed: String,
    pub change_value: String,
    pub message_sent: String,
}

impl SnapshotRow {
    /// Values in persisted column order, for exports.
    pub fn values(&self) -> [&str; 17] {
        [
            &self.name,
            &self.cnpj,
            &self.seller_name,
            &self.recency,
            &self.frequency,
            &self.value,
            &self.first_purchase_date,
            &self.last_purchase_date,
            &self.snapshot_day,
            &self.m0_segment,
            &self.prev_recency,
            &self.prev_frequency,
            &self.prev_value,
            &self.m1_segment,
            &self.changed,
            &self.change_value,
            &self.message_sent,
        ]
    }
}

/// Deterministic blob name for a snapshot cutoff day (the last calendar day
/// of the target month).
pub fn snapshot_name(day: NaiveDate) -> String {
    format!(
        "snapshot_{}_{:02}_{:02}",
        day.year(),
        day.month(),
        day.day()
    )
}

/// Full row set for a named snapshot, or None when it was never generated.
pub fn get(db: &Database, name: &str) -> Result<Option<Vec<SnapshotRow>>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            r#"
            SELECT name, cnpj, seller_name, recency, frequency, value,
                   first_purchase_date, last_purchase_date, snapshot_day,
                   m0_segment, prev_recency, prev_frequency, prev_value,
                   m1_segment, changed, change_value, message_sent
            FROM snapshot_rows
            WHERE snapshot_name = ?1
            ORDER BY position
            "#,
        )?;

        let rows = stmt.query_map(params![name], |row| {
            Ok(SnapshotRow {
                name: row.get(0)?,
                cnpj: row.get(1)?,
                seller_name: row.get(2)?,
                recency: row.get(3)?,
                frequency: row.get(4)?,
                value: row.get(5)?,
                first_purchase_date: row.get(6)?,
                last_purchase_date: row.get(7)?,
                snapshot_day: row.get(8)?,
                m0_segment: row.get(9)?,
                prev_recency: row.get(10)?,
                prev_frequency: row.get(11)?,
                prev_value: row.get(12)?,
                m1_segment: row.get(13)?,
                changed: row.get(14)?,
                change_value: row.get(15)?,
                message_sent: row.get(16)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(if out.is_empty() { None } else { Some(out) })
    })
}

/// Full overwrite of a named snapshot in a single transaction: either the
/// whole new row set lands or the prior state is left untouched.
pub fn put(db: &Database, name: &str, rows: &[SnapshotRow]) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        let tx = conn
            .transaction()
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        tx.execute(
            "DELETE FROM snapshot_rows WHERE snapshot_name = ?1",
            params![name],
        )?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO snapshot_rows (
                    snapshot_name, position, name, cnpj, seller_name, recency,
                    frequency, value, first_purchase_date, last_purchase_date,
                    snapshot_day, m0_segment, prev_recency, prev_frequency,
                    prev_value, m1_segment, changed, change_value, message_sent
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                          ?14, ?15, ?16, ?17, ?18, ?19)
                "#,
            )?;
            for (position, row) in rows.iter().enumerate() {
                stmt.execute(params![
                    name,
                    position as i64,
                    &row.name,
                    &row.cnpj,
                    &row.seller_name,
                    &row.recency,
                    &row.frequency,
                    &row.value,
                    &row.first_purchase_date,
                    &row.last_purchase_date,
                    &row.snapshot_day,
                    &row.m0_segment,
                    &row.prev_recency,
                    &row.prev_frequency,
                    &row.prev_value,
                    &row.m1_segment,
                    &row.changed,
                    &row.change_value,
                    &row.message_sent,
                ])?;
            }
        }
        tx.commit()
            .map_err(|e| ServerError::DbError(e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_names_are_zero_padded() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(snapshot_name(day), "snapshot_2024_05_31");
        let day = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        assert_eq!(snapshot_name(day), "snapshot_2023_12_01");
    }
}
