// src/db/sellers.rs
use crate::db::connection::Database;
use crate::errors::ServerError;
use rusqlite::params;

/// Roster rows are reference data: edited rarely, read by the presentation
/// layer to partition customers into "active seller" vs "no seller assigned".
pub fn upsert_seller(db: &Database, seller_name: &str, status: &str) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        conn.execute(
            r#"
            INSERT INTO sellers (seller_name, status) VALUES (?1, ?2)
            ON CONFLICT(seller_name) DO UPDATE SET status = excluded.status
            "#,
            params![seller_name, status],
        )?;
        Ok(())
    })
}

/// Sorted names of sellers whose status marks them active. A missing or
/// empty roster yields an empty list, never an error.
pub fn active_sellers(db: &Database) -> Result<Vec<String>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT seller_name FROM sellers WHERE LOWER(status) IN ('active', 'ativo')
             ORDER BY seller_name",
        )?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(out)
    })
}
