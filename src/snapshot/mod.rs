// src/snapshot/mod.rs
//
// Orchestrates one snapshot run: load the full order history, aggregate for
// the current and previous month-end cutoffs, merge into transition rows,
// join display names, and overwrite the named blob. The whole run is a pure
// function of the stored orders plus the cutoff, so re-running after a
// transient failure reproduces the same rows.

use crate::db::connection::Database;
use crate::db::snapshots::{self, SnapshotRow};
use crate::db::{clients, orders, runs};
use crate::domain::metrics::{build_period_metrics, last_day_of_previous_month};
use crate::domain::order::parse_timestamp;
use crate::domain::segment::Segment;
use crate::domain::transition::{build_transitions, PreviousPeriod, SnapshotDiff, NO_HISTORY_LABEL};
use crate::errors::ServerError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FMT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    /// Regenerating an annotated month discards message_sent marks unless
    /// this is set; false matches the historical behavior.
    pub preserve_annotations: bool,
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// The cutoff for a run started "today": last day of the previous month.
pub fn current_cutoff(today: NaiveDate) -> NaiveDate {
    last_day_of_previous_month(today)
}

/// Serialize a diff row into persisted text form (fixed 17-column order).
pub fn to_row(diff: &SnapshotDiff) -> SnapshotRow {
    let (prev_recency, prev_frequency, prev_value) = match &diff.previous {
        Some(p) => (
            p.recency.to_string(),
            p.frequency.to_string(),
            format!("{:.2}", p.value),
        ),
        None => (String::new(), String::new(), String::new()),
    };

    SnapshotRow {
        name: diff.display_name.clone(),
        cnpj: diff.customer_id.clone(),
        seller_name: diff.seller_name.clone().unwrap_or_default(),
        recency: diff.recency.to_string(),
        frequency: diff.frequency.to_string(),
        value: format!("{:.2}", diff.value),
        first_purchase_date: diff.first_purchase_date.format(DATETIME_FMT).to_string(),
        last_purchase_date: diff.last_purchase_date.format(DATETIME_FMT).to_string(),
        snapshot_day: diff.snapshot_day.format(DATE_FMT).to_string(),
        m0_segment: diff.current_segment.label().to_string(),
        prev_recency,
        prev_frequency,
        prev_value,
        m1_segment: diff.previous_label().to_string(),
        changed: diff.changed.to_string(),
        change_value: format!("{:.2}", diff.change_value),
        message_sent: diff.message_sent.to_string(),
    }
}

fn parse_bool(s: &str) -> bool {
    s == "1" || s.eq_ignore_ascii_case("true")
}

/// Typed parse of a persisted row. Errors mean the row is unusable; callers
/// drop it with a warning and keep going.
pub fn parse_row(row: &SnapshotRow) -> Result<SnapshotDiff, String> {
    let recency: i64 = row.recency.parse().map_err(|_| "bad recency")?;
    let frequency: i64 = row.frequency.parse().map_err(|_| "bad frequency")?;
    let value: f64 = row.value.parse().map_err(|_| "bad value")?;
    let first_purchase_date =
        parse_timestamp(&row.first_purchase_date).ok_or("bad first_purchase_date")?;
    let last_purchase_date =
        parse_timestamp(&row.last_purchase_date).ok_or("bad last_purchase_date")?;
    let snapshot_day = NaiveDate::parse_from_str(&row.snapshot_day, DATE_FMT)
        .map_err(|_| "bad snapshot_day")?;

    let previous = if row.m1_segment == NO_HISTORY_LABEL || row.prev_recency.is_empty() {
        None
    } else {
        Some(PreviousPeriod {
            recency: row.prev_recency.parse().map_err(|_| "bad prev_recency")?,
            frequency: row
                .prev_frequency
                .parse()
                .map_err(|_| "bad prev_frequency")?,
            value: row.prev_value.parse().map_err(|_| "bad prev_value")?,
            segment: Segment::parse_label(&row.m1_segment),
        })
    };

    Ok(SnapshotDiff {
        customer_id: row.cnpj.clone(),
        display_name: row.name.clone(),
        seller_name: if row.seller_name.is_empty() {
            None
        } else {
            Some(row.seller_name.clone())
        },
        recency,
        frequency,
        value,
        first_purchase_date,
        last_purchase_date,
        snapshot_day,
        current_segment: Segment::parse_label(&row.m0_segment),
        previous,
        changed: parse_bool(&row.changed),
        change_value: row.change_value.parse().unwrap_or(0.0),
        message_sent: parse_bool(&row.message_sent),
        message_timestamp: String::new(),
        message_by: String::new(),
    })
}

/// Generate and persist the snapshot for the month ending before `today`.
/// Returns the blob name and the number of rows written.
pub fn generate_and_save(
    db: &Database,
    today: NaiveDate,
    options: &SnapshotOptions,
) -> Result<(String, usize), ServerError> {
    let run_id = runs::start_run(db, "snapshot", now_unix())?;
    match run(db, today, options) {
        Ok((name, count)) => {
            runs::end_run(db, run_id, now_unix(), count, true, None)?;
            println!("✅ Snapshot {name} saved ({count} rows).");
            Ok((name, count))
        }
        Err(e) => {
            runs::end_run(db, run_id, now_unix(), 0, false, Some(e.to_string()))?;
            Err(e)
        }
    }
}

fn run(
    db: &Database,
    today: NaiveDate,
    options: &SnapshotOptions,
) -> Result<(String, usize), ServerError> {
    let order_history = orders::load_all_orders(db)?;
    if order_history.is_empty() {
        return Err(ServerError::MissingInput(
            "no order history; run a data update first".into(),
        ));
    }

    let cutoff = current_cutoff(today);
    let previous_cutoff = last_day_of_previous_month(cutoff);

    // Both periods are recomputed independently from the same raw set.
    let current = build_period_metrics(&order_history, cutoff);
    let previous = build_period_metrics(&order_history, previous_cutoff);

    let mut diffs = build_transitions(&current, &previous, cutoff);

    // Join display names; a directory miss yields an empty name.
    let names = clients::name_index(db)?;
    for diff in &mut diffs {
        if let Some(name) = names.get(&diff.customer_id) {
            diff.display_name = name.clone();
        }
    }

    // Stable output order for the persisted blob.
    diffs.sort_by(|a, b| b.last_purchase_date.cmp(&a.last_purchase_date));

    let name = snapshots::snapshot_name(cutoff);
    let mut rows: Vec<SnapshotRow> = diffs.iter().map(to_row).collect();

    // Regeneration trap: the fresh rows carry cleared annotations. Decide
    // explicitly what happens to marks on the existing blob.
    if let Some(existing) = snapshots::get(db, &name)? {
        let annotated: HashMap<&str, &str> = existing
            .iter()
            .filter(|r| parse_bool(&r.message_sent))
            .map(|r| (r.cnpj.as_str(), r.message_sent.as_str()))
            .collect();

        if !annotated.is_empty() {
            if options.preserve_annotations {
                for row in &mut rows {
                    if annotated.contains_key(row.cnpj.as_str()) {
                        row.message_sent = "true".to_string();
                    }
                }
                println!(
                    "ℹ️ Preserved {} outreach annotations across regeneration.",
                    annotated.len()
                );
            } else {
                eprintln!(
                    "⚠️ Regenerating {name} discards {} outreach annotations.",
                    annotated.len()
                );
            }
        }
    }

    snapshots::put(db, &name, &rows)?;
    Ok((name, rows.len()))
}

/// Load and parse the snapshot for the month ending before `today`, if it
/// was ever generated. Unparseable rows are dropped with a warning.
pub fn load_current(
    db: &Database,
    today: NaiveDate,
) -> Result<Option<(String, Vec<SnapshotDiff>)>, ServerError> {
    let name = snapshots::snapshot_name(current_cutoff(today));
    let Some(rows) = snapshots::get(db, &name)? else {
        return Ok(None);
    };

    let mut diffs = Vec::with_capacity(rows.len());
    for row in &rows {
        match parse_row(row) {
            Ok(diff) => diffs.push(diff),
            Err(reason) => eprintln!("⚠️ Dropping snapshot row for {}: {reason}", row.cnpj),
        }
    }
    Ok(Some((name, diffs)))
}

/// Mark message_sent for the given customer ids and write the blob back.
/// Works on the raw text rows so untouched values survive byte-identical.
pub fn mark_messages(
    db: &Database,
    today: NaiveDate,
    customer_ids: &[String],
) -> Result<usize, ServerError> {
    let name = snapshots::snapshot_name(current_cutoff(today));
    let Some(mut rows) = snapshots::get(db, &name)? else {
        return Err(ServerError::MissingInput(format!(
            "snapshot {name} does not exist"
        )));
    };

    let mut marked = 0;
    for row in &mut rows {
        if customer_ids.iter().any(|id| id == &row.cnpj) && !parse_bool(&row.message_sent) {
            row.message_sent = "true".to_string();
            marked += 1;
        }
    }

    if marked > 0 {
        snapshots::put(db, &name, &rows)?;
    }
    Ok(marked)
}
