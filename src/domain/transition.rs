// src/domain/transition.rs

use crate::domain::metrics::CustomerPeriodMetrics;
use crate::domain::segment::{classify, Segment};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Text persisted in the m1 column when a customer has no previous-period
/// history. Never equal to any real segment label.
pub const NO_HISTORY_LABEL: &str = "No History";

/// Previous-period side of a diff row, present only when the customer had
/// orders before the prior cutoff.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviousPeriod {
    pub recency: i64,
    pub frequency: i64,
    pub value: f64,
    pub segment: Segment,
}

/// One customer's month-over-month transition. Created once per run;
/// only the message_* annotations are ever mutated afterwards (by the
/// outreach-tracking UI).
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotDiff {
    pub customer_id: String,
    /// Display name joined from the client directory; empty on a miss.
    pub display_name: String,
    pub seller_name: Option<String>,
    pub recency: i64,
    pub frequency: i64,
    pub value: f64,
    pub first_purchase_date: chrono::NaiveDateTime,
    pub last_purchase_date: chrono::NaiveDateTime,
    pub snapshot_day: NaiveDate,
    pub current_segment: Segment,
    /// None is the "No History" sentinel.
    pub previous: Option<PreviousPeriod>,
    pub changed: bool,
    pub change_value: f64,
    pub message_sent: bool,
    pub message_timestamp: String,
    pub message_by: String,
}

impl SnapshotDiff {
    pub fn previous_label(&self) -> &'static str {
        match &self.previous {
            Some(p) => p.segment.label(),
            None => NO_HISTORY_LABEL,
        }
    }
}

/// Join the current-period aggregation against the previous-period one,
/// current-preferring: every current customer appears, customers present
/// only in the previous period are dropped.
///
/// `changed` compares segment labels only; a missing previous period always
/// counts as changed (the sentinel differs from every real label) but never
/// as an improvement or decline. `change_value` is previous minus current,
/// and only when the segment changed AND a previous period exists.
///
/// Every output row is freshly stamped with cleared message annotations.
/// Regenerating an annotated month therefore discards the annotations unless
/// the caller merges them back before the overwrite; see the runner.
pub fn build_transitions(
    current: &[CustomerPeriodMetrics],
    previous: &[CustomerPeriodMetrics],
    snapshot_day: NaiveDate,
) -> Vec<SnapshotDiff> {
    let previous_by_id: HashMap<&str, &CustomerPeriodMetrics> = previous
        .iter()
        .map(|m| (m.customer_id.as_str(), m))
        .collect();

    current
        .iter()
        .map(|cur| {
            let current_segment = classify(cur.recency, cur.frequency);

            let prev = previous_by_id.get(cur.customer_id.as_str()).map(|p| {
                PreviousPeriod {
                    recency: p.recency,
                    frequency: p.frequency,
                    value: p.value,
                    segment: classify(p.recency, p.frequency),
                }
            });

            let changed = match &prev {
                Some(p) => p.segment != current_segment,
                None => true,
            };
            let change_value = match (&prev, changed) {
                (Some(p), true) => p.value - cur.value,
                _ => 0.0,
            };

            SnapshotDiff {
                customer_id: cur.customer_id.clone(),
                display_name: String::new(),
                seller_name: cur.seller_name.clone(),
                recency: cur.recency,
                frequency: cur.frequency,
                value: cur.value,
                first_purchase_date: cur.first_purchase_date,
                last_purchase_date: cur.last_purchase_date,
                snapshot_day,
                current_segment,
                previous: prev,
                changed,
                change_value,
                message_sent: false,
                message_timestamp: String::new(),
                message_by: String::new(),
            }
        })
        .collect()
}
