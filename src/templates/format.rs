// src/templates/format.rs
//
// Display formatting for the dashboard. Values are rounded the way the
// operators read them: whole currency with thousand separators, and
// purchase dates as rough ages rather than timestamps.

use chrono::NaiveDate;

/// "R$ 1.250" style: rounded to whole units, '.' as the thousands separator.
pub fn money(value: f64) -> String {
    let rounded = value.round() as i64;
    let negative = rounded < 0;
    let digits = rounded.abs().to_string();

    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    if negative {
        format!("R$ -{grouped}")
    } else {
        format!("R$ {grouped}")
    }
}

/// Age of a date relative to `today`: "14 days", "3 months", "1y 2m".
pub fn relative_date(date: NaiveDate, today: NaiveDate) -> String {
    let total_days = (today - date).num_days();
    if total_days < 0 {
        return String::new();
    }

    if total_days <= 31 {
        let unit = if total_days == 1 { "day" } else { "days" };
        format!("{total_days} {unit}")
    } else if total_days <= 365 {
        let months = ((total_days as f64) / 30.0).round() as i64;
        let unit = if months == 1 { "month" } else { "months" };
        format!("{months} {unit}")
    } else {
        let years = total_days / 365;
        let months = (((total_days % 365) as f64) / 30.0).round() as i64;
        if months == 0 {
            format!("{years}y")
        } else {
            format!("{years}y {months}m")
        }
    }
}
