// src/db/clients.rs
use crate::db::connection::Database;
use crate::errors::ServerError;
use rusqlite::params;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct ClientRow {
    pub customer_id: String,
    pub display_name: String,
    pub whatsapp: String,
}

pub fn upsert_clients(db: &Database, clients: &[ClientRow], now: i64) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        let tx = conn
            .transaction()
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO clients (customer_id, display_name, whatsapp, fetched_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(customer_id) DO UPDATE SET
                    display_name = excluded.display_name,
                    whatsapp     = excluded.whatsapp,
                    fetched_at   = excluded.fetched_at
                "#,
            )?;
            for c in clients {
                stmt.execute(params![&c.customer_id, &c.display_name, &c.whatsapp, now])?;
            }
        }
        tx.commit()
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        Ok(())
    })
}

/// customer id -> display name, for joining into snapshot output.
/// A missing client simply won't be in the map; callers default to "".
pub fn name_index(db: &Database) -> Result<HashMap<String, String>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT customer_id, display_name FROM clients")?;
        let rows = stmt.query_map([], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
        })?;
        let mut map = HashMap::new();
        for r in rows {
            let (id, name) = r.map_err(|e| ServerError::DbError(e.to_string()))?;
            map.insert(id, name);
        }
        Ok(map)
    })
}

pub fn known_customer_ids(db: &Database) -> Result<HashSet<String>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT customer_id FROM clients")?;
        let rows = stmt.query_map([], |r| r.get::<_, String>(0))?;
        let mut set = HashSet::new();
        for r in rows {
            set.insert(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(set)
    })
}

/// customer id -> whatsapp number, for outreach links on the dashboard.
pub fn whatsapp_index(db: &Database) -> Result<HashMap<String, String>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT customer_id, whatsapp FROM clients WHERE whatsapp != ''")?;
        let rows = stmt.query_map([], |r| {
            Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
        })?;
        let mut map = HashMap::new();
        for r in rows {
            let (id, phone) = r.map_err(|e| ServerError::DbError(e.to_string()))?;
            map.insert(id, phone);
        }
        Ok(map)
    })
}
