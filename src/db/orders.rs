// src/db/orders.rs
use crate::db::connection::Database;
use crate::domain::order::OrderRecord;
use crate::errors::ServerError;
use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

/// An order row as stored: everything is text until the domain parses it.
#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub order_id: String,
    pub customer_id: String,
    pub seller_name: Option<String>,
    pub created_at: String,
    pub net_value: String,
    pub status: String,
}

/// Upsert a batch of fetched orders in one transaction. Re-fetched order ids
/// replace the stored row (last write wins on duplicates).
pub fn upsert_orders(db: &Database, orders: &[StoredOrder], now: i64) -> Result<usize, ServerError> {
    db.with_conn(|conn| {
        let tx = conn
            .transaction()
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO orders (order_id, customer_id, seller_name, created_at, net_value, status, fetched_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(order_id) DO UPDATE SET
                    customer_id = excluded.customer_id,
                    seller_name = excluded.seller_name,
                    created_at  = excluded.created_at,
                    net_value   = excluded.net_value,
                    status      = excluded.status,
                    fetched_at  = excluded.fetched_at
                "#,
            )?;
            for o in orders {
                stmt.execute(params![
                    &o.order_id,
                    &o.customer_id,
                    &o.seller_name,
                    &o.created_at,
                    &o.net_value,
                    &o.status,
                    now,
                ])?;
            }
        }
        tx.commit()
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        Ok(orders.len())
    })
}

/// Load the full order history, parsed at the typed boundary. Rows with
/// unparseable timestamps or amounts are dropped with a warning; they never
/// abort the run.
pub fn load_all_orders(db: &Database) -> Result<Vec<OrderRecord>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT order_id, customer_id, seller_name, created_at, net_value, status
             FROM orders ORDER BY created_at",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (order_id, customer_id, seller, created_at, net_value, status) =
                row.map_err(|e| ServerError::DbError(e.to_string()))?;
            match OrderRecord::from_text(
                &order_id,
                &customer_id,
                seller.as_deref(),
                &created_at,
                &net_value,
                &status,
            ) {
                // Waiting orders are filtered at ingest; rows stored before
                // that filter existed are skipped here.
                Ok(rec) if rec.is_waiting() => {}
                Ok(rec) => out.push(rec),
                Err(reason) => {
                    eprintln!("⚠️ Dropping order {order_id}: {reason}");
                }
            }
        }
        Ok(out)
    })
}

/// Most recent order date on record, used to resume the backfill.
pub fn last_order_date(db: &Database) -> Result<Option<NaiveDate>, ServerError> {
    db.with_conn(|conn| {
        let max: Option<String> = conn
            .query_row("SELECT MAX(created_at) FROM orders", [], |r| r.get(0))
            .optional()?
            .flatten();

        Ok(max
            .as_deref()
            .and_then(crate::domain::order::parse_timestamp)
            .map(|dt| dt.date()))
    })
}

/// Distinct customer ids seen in the order history.
pub fn customer_ids(db: &Database) -> Result<Vec<String>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT DISTINCT customer_id FROM orders")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(out)
    })
}
