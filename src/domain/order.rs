// src/domain/order.rs

use chrono::{NaiveDate, NaiveDateTime};

/// Upstream status marking an unfulfilled order; excluded at ingest.
pub const WAITING_STATUS: &str = "ESPERA";

/// One fulfilled order, fully typed. Built from the text-typed storage rows
/// (or the API payload) at the boundary; the core never handles raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_id: String,
    pub seller_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub net_value: f64,
    pub status: String,
}

impl OrderRecord {
    pub fn is_waiting(&self) -> bool {
        self.status.eq_ignore_ascii_case(WAITING_STATUS)
    }

    /// Typed parse from a stored text row. A malformed timestamp or amount
    /// makes this row unusable; the caller drops it with a warning and the
    /// run continues.
    pub fn from_text(
        order_id: &str,
        customer_id: &str,
        seller_name: Option<&str>,
        created_at: &str,
        net_value: &str,
        status: &str,
    ) -> Result<Self, String> {
        if customer_id.trim().is_empty() {
            return Err("empty customer id".to_string());
        }

        let created_at = parse_timestamp(created_at)
            .ok_or_else(|| format!("unparseable timestamp '{created_at}'"))?;

        let net_value: f64 = net_value
            .trim()
            .parse()
            .map_err(|_| format!("unparseable amount '{net_value}'"))?;

        Ok(Self {
            order_id: order_id.to_string(),
            customer_id: customer_id.trim().to_string(),
            seller_name: seller_name
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            created_at,
            net_value,
            status: status.to_string(),
        })
    }
}

/// Accept the timestamp shapes the upstream has been seen emitting:
/// RFC 3339-ish, space-separated, and bare dates (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
