// src/fetch/sync.rs
//
// Keep the local order history and client directory in step with the
// external API. Both backfills are resumable and idempotent: orders are
// deduplicated by order id (last write wins), clients by customer id.

use crate::db::connection::Database;
use crate::db::{clients, orders, runs};
use crate::domain::order::{parse_timestamp, WAITING_STATUS};
use crate::domain::phone::{first_valid, normalize_phone};
use crate::errors::ServerError;
use crate::fetch::api::OrderApi;
use crate::fetch::models::{ApiCustomer, ApiOrder};
use chrono::{Duration, NaiveDate};
use std::time::{SystemTime, UNIX_EPOCH};

/// When the local store is empty, backfill this far back.
const INITIAL_WINDOW_DAYS: i64 = 365;

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Convert an API order into its storable text form. Orders missing the
/// fields we aggregate on, or still in the waiting state, are skipped with a
/// warning; a bad row never aborts the sync.
fn to_stored(order: &ApiOrder) -> Option<orders::StoredOrder> {
    let order_id = order.order_id.as_deref().filter(|s| !s.is_empty())?;

    let Some(customer_id) = order.customer_id.as_deref().filter(|s| !s.is_empty()) else {
        eprintln!("⚠️ Skipping order {order_id}: missing customer id");
        return None;
    };
    let Some(created_at) = order.created_at.as_deref().and_then(parse_timestamp) else {
        eprintln!("⚠️ Skipping order {order_id}: missing or unparseable createdAt");
        return None;
    };
    let Some(net_value) = order.net_value() else {
        eprintln!("⚠️ Skipping order {order_id}: missing or unparseable totalValue");
        return None;
    };

    let status = order.status.as_deref().unwrap_or("").to_string();
    if status.eq_ignore_ascii_case(WAITING_STATUS) {
        return None;
    }

    Some(orders::StoredOrder {
        order_id: order_id.to_string(),
        customer_id: customer_id.to_string(),
        seller_name: order
            .seller
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        created_at: created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        net_value: format!("{net_value}"),
        status,
    })
}

/// Fetch any order days missing since the last stored order, up to today.
/// Returns the number of rows written.
pub fn backfill_orders(
    db: &Database,
    api: &OrderApi,
    today: NaiveDate,
) -> Result<usize, ServerError> {
    let start = match orders::last_order_date(db)? {
        Some(last) if last >= today => {
            println!("✅ Orders are up to date.");
            return Ok(0);
        }
        Some(last) => last + Duration::days(1),
        None => {
            let start = today - Duration::days(INITIAL_WINDOW_DAYS);
            println!("🔄 No stored orders. Backfilling from {start} to {today}");
            start
        }
    };

    let mut written = 0;
    api.fetch_orders_range(start, today, |day, batch| {
        let stored: Vec<_> = batch.iter().filter_map(to_stored).collect();
        if stored.is_empty() {
            eprintln!("ℹ️ No usable orders for {day}");
            return Ok(());
        }
        written += orders::upsert_orders(db, &stored, now_unix())?;
        Ok(())
    })?;

    println!("✅ Orders updated ({written} rows).");
    Ok(written)
}

fn to_client_row(customer: &ApiCustomer) -> Option<clients::ClientRow> {
    let customer_id = customer.document.as_deref().filter(|s| !s.is_empty())?;

    // Phone columns in priority order, each validated before acceptance.
    let whatsapp = first_valid(
        &[
            customer.whatsapp.as_deref(),
            customer.mobile.as_deref(),
            customer.telefone.as_deref(),
        ],
        |c| normalize_phone(Some(c)),
    )
    .unwrap_or_default();

    Some(clients::ClientRow {
        customer_id: customer_id.to_string(),
        display_name: customer.name.clone().unwrap_or_default(),
        whatsapp,
    })
}

/// Fetch directory entries for customers that appear in the order history
/// but not in the directory yet. A customer the API no longer knows is
/// skipped, not an error.
pub fn backfill_missing_clients(db: &Database, api: &OrderApi) -> Result<usize, ServerError> {
    let known = clients::known_customer_ids(db)?;
    let missing: Vec<String> = orders::customer_ids(db)?
        .into_iter()
        .filter(|id| !known.contains(id) && id != "#N/A")
        .collect();

    if missing.is_empty() {
        println!("✅ No missing clients.");
        return Ok(0);
    }
    println!("🔍 Found {} missing clients. Fetching from API...", missing.len());

    let mut rows = Vec::new();
    for customer_id in &missing {
        match api.fetch_customer(customer_id)? {
            Some(customer) => {
                if let Some(row) = to_client_row(&customer) {
                    rows.push(row);
                }
            }
            None => eprintln!("⚠️ Customer {customer_id} not found upstream"),
        }
    }

    clients::upsert_clients(db, &rows, now_unix())?;
    println!("✅ Clients updated ({} rows).", rows.len());
    Ok(rows.len())
}

/// Run both backfills with run bookkeeping. A failure ends the run with the
/// error recorded; nothing partial is retried automatically.
pub fn update_data(db: &Database, api: &OrderApi, today: NaiveDate) -> Result<(), ServerError> {
    let run_id = runs::start_run(db, "sync", now_unix())?;

    let result = backfill_orders(db, api, today)
        .and_then(|written| backfill_missing_clients(db, api).map(|c| written + c));

    match result {
        Ok(rows) => {
            runs::end_run(db, run_id, now_unix(), rows, true, None)?;
            Ok(())
        }
        Err(e) => {
            runs::end_run(db, run_id, now_unix(), 0, false, Some(e.to_string()))?;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_order(json: &str) -> ApiOrder {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn waiting_orders_are_dropped_at_ingest() {
        let order = api_order(
            r#"{"orderId":"1","customerId":"C1","createdAt":"2024-05-01","totalValue":10,"status":"ESPERA"}"#,
        );
        assert!(to_stored(&order).is_none());

        let order = api_order(
            r#"{"orderId":"1","customerId":"C1","createdAt":"2024-05-01","totalValue":10,"status":"FATURADO"}"#,
        );
        assert!(to_stored(&order).is_some());
    }

    #[test]
    fn malformed_orders_are_skipped_not_fatal() {
        for json in [
            r#"{"orderId":"1","createdAt":"2024-05-01","totalValue":10,"status":"OK"}"#,
            r#"{"orderId":"1","customerId":"C1","createdAt":"garbage","totalValue":10,"status":"OK"}"#,
            r#"{"orderId":"1","customerId":"C1","createdAt":"2024-05-01","status":"OK"}"#,
            r#"{"customerId":"C1","createdAt":"2024-05-01","totalValue":10,"status":"OK"}"#,
        ] {
            assert!(to_stored(&api_order(json)).is_none(), "{json}");
        }
    }

    #[test]
    fn stored_timestamps_are_normalized() {
        let order = api_order(
            r#"{"orderId":"1","customerId":"C1","createdAt":"2024-05-01T08:30:00","totalValue":"12.5","status":"OK"}"#,
        );
        let stored = to_stored(&order).unwrap();
        assert_eq!(stored.created_at, "2024-05-01 08:30:00");
        assert_eq!(stored.net_value, "12.5");
    }

    #[test]
    fn client_rows_coalesce_phone_candidates_in_order() {
        let customer: ApiCustomer = serde_json::from_str(
            r#"{"document":"C1","name":"Acme","whatsapp":"bad","mobile":"11987654321"}"#,
        )
        .unwrap();
        let row = to_client_row(&customer).unwrap();
        assert_eq!(row.whatsapp, "5511987654321");
        assert_eq!(row.display_name, "Acme");

        let customer: ApiCustomer = serde_json::from_str(r#"{"name":"NoDoc"}"#).unwrap();
        assert!(to_client_row(&customer).is_none());
    }
}
