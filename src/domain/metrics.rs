// src/domain/metrics.rs

use crate::domain::order::OrderRecord;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

/// Per-customer aggregation for one snapshot cutoff. Recomputed fresh on
/// every run, never mutated in place.
///
/// Invariants: recency >= 0, frequency >= 1 (customers with no orders in the
/// window are absent from the output, not emitted as zero rows), value sums
/// exactly the orders counted by frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerPeriodMetrics {
    pub customer_id: String,
    pub seller_name: Option<String>,
    /// Days between the cutoff and the customer's most recent order.
    pub recency: i64,
    pub frequency: i64,
    pub value: f64,
    pub first_purchase_date: NaiveDateTime,
    pub last_purchase_date: NaiveDateTime,
}

/// Aggregate raw orders into one row per customer for the given cutoff.
///
/// Only orders dated on or before the cutoff count. The seller is the last
/// non-null seller in chronological order: if the most recent order has no
/// seller, the most recent earlier one that does wins. Output ordering is
/// unspecified; consumers sort for display.
pub fn build_period_metrics(
    orders: &[OrderRecord],
    cutoff: NaiveDate,
) -> Vec<CustomerPeriodMetrics> {
    let mut by_customer: HashMap<&str, Vec<&OrderRecord>> = HashMap::new();
    for order in orders {
        if order.created_at.date() <= cutoff {
            by_customer
                .entry(order.customer_id.as_str())
                .or_default()
                .push(order);
        }
    }

    let mut out = Vec::with_capacity(by_customer.len());
    for (customer_id, mut group) in by_customer {
        group.sort_by_key(|o| o.created_at);

        // Sorted and non-empty, so first/last are safe.
        let first = group.first().map(|o| o.created_at);
        let last = group.last().map(|o| o.created_at);
        let (Some(first), Some(last)) = (first, last) else {
            continue;
        };

        let seller_name = group
            .iter()
            .rev()
            .find_map(|o| o.seller_name.clone());

        out.push(CustomerPeriodMetrics {
            customer_id: customer_id.to_string(),
            seller_name,
            recency: (cutoff - last.date()).num_days(),
            frequency: group.len() as i64,
            value: group.iter().map(|o| o.net_value).sum(),
            first_purchase_date: first,
            last_purchase_date: last,
        });
    }
    out
}

/// Last calendar day of the month before the given date's month. Applied to
/// "today" it yields the current snapshot cutoff; applied to a cutoff it
/// yields the previous-period cutoff.
pub fn last_day_of_previous_month(date: NaiveDate) -> NaiveDate {
    let first = date
        .with_day(1)
        .unwrap_or(date);
    first - Duration::days(1)
}
