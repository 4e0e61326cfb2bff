use crate::config::AppConfig;
use crate::db::connection::{init_db, Database};
use crate::db::orders::StoredOrder;
use crate::fetch::api::OrderApiConfig;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_DB: AtomicU32 = AtomicU32::new(0);

/// Initialize a fresh test DB using the production schema. Each call gets
/// its own file so parallel tests don't trample each other.
pub fn init_test_db() -> Database {
    let n = NEXT_DB.fetch_add(1, Ordering::SeqCst);
    let path = format!("test_{}_{}.sqlite", std::process::id(), n);
    let _ = std::fs::remove_file(&path);

    let db = Database::new(path);
    init_db(&db, "sql/schema.sql")
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    db
}

pub const TEST_PASSWORD: &str = "correct horse";

pub fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        db_path: "unused".to_string(),
        app_password: TEST_PASSWORD.to_string(),
        api: OrderApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
            seller_id: "s".to_string(),
        },
        preserve_annotations: false,
    }
}

pub fn stored_order(
    order_id: &str,
    customer_id: &str,
    seller: Option<&str>,
    created_at: &str,
    net_value: &str,
) -> StoredOrder {
    StoredOrder {
        order_id: order_id.to_string(),
        customer_id: customer_id.to_string(),
        seller_name: seller.map(str::to_string),
        created_at: created_at.to_string(),
        net_value: net_value.to_string(),
        status: "FATURADO".to_string(),
    }
}
