// src/router.rs
use crate::auth::sessions;
use crate::auth::token::password_matches;
use crate::config::AppConfig;
use crate::db::connection::Database;
use crate::db::{clients, runs, sellers, snapshots};
use crate::domain::phone::is_whatsapp_ready;
use crate::domain::segment::Segment;
use crate::domain::transition::SnapshotDiff;
use crate::errors::ServerError;
use crate::fetch::api::OrderApi;
use crate::fetch::sync;
use crate::responses::html::redirect_with_cookie;
use crate::responses::{html_response, redirect_response, ResultResp};
use crate::snapshot::{self, SnapshotOptions};
use crate::spreadsheets::export_csv::export_snapshot_csv;
use crate::spreadsheets::export_xlsx::export_snapshot_xlsx;
use crate::templates::components::segment_table::RowVm;
use crate::templates::format::{money, relative_date};
use crate::templates::pages::dashboard::{DashboardVm, GroupVm, RunVm};
use crate::templates::pages::{dashboard_page, login_page, no_snapshot_page};
use astra::Request;
use chrono::{Local, NaiveDate};
use std::collections::HashMap;
use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};

const PAGE_SIZE: usize = 10;
const SESSION_COOKIE: &str = "session";

/// Pseudo-seller used by the e-commerce channel; hidden from outreach.
const ECOMMERCE_SELLER: &str = "NUVEMSHOP";

/// Dashboard grouping of segments into outreach buckets, in display order.
const OUTREACH_GROUPS: [(&str, &str, &[Segment]); 4] = [
    ("🏆 Sales champions", "champions", &[Segment::Champions, Segment::Loyal]),
    (
        "🔄 Potential sales",
        "potential",
        &[
            Segment::PotentialLoyal,
            Segment::Recent,
            Segment::Promising,
            Segment::NeedsAttention,
            Segment::CantLoseThem,
        ],
    ),
    (
        "⚠️ Attention",
        "attention",
        &[Segment::AtRisk, Segment::AboutToSleep, Segment::Hibernating],
    ),
    ("❄️ Lost", "lost", &[Segment::Lost]),
];

pub fn handle(req: Request, db: &Database, cfg: &AppConfig) -> ResultResp {
    let session_token = cookie_value(&req, SESSION_COOKIE);
    let (parts, body) = req.into_parts();
    let method = parts.method.as_str().to_string();
    let path = parts.uri.path().to_string();
    let query = parse_pairs(parts.uri.query().unwrap_or(""));

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => redirect_response("/dashboard"),

        ("GET", "/login") => html_response(login_page(lookup(&query, "failed").is_some())),

        ("POST", "/login") => {
            let form = parse_pairs(&read_body(body)?);
            let password = lookup(&form, "password").unwrap_or_default();

            if !password_matches(&password, &cfg.app_password) {
                return redirect_response("/login?failed=1");
            }

            let token = db.with_conn(|conn| sessions::create_session(conn, now_unix()))?;
            redirect_with_cookie(
                "/dashboard",
                &format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax"),
            )
        }

        ("POST", "/logout") => {
            if let Some(token) = &session_token {
                db.with_conn(|conn| sessions::revoke_session(conn, token, now_unix()))?;
            }
            redirect_with_cookie(
                "/login",
                &format!("{SESSION_COOKIE}=; Path=/; Max-Age=0"),
            )
        }

        ("GET", "/dashboard") => {
            require_session(db, &session_token)?;
            dashboard(db, &query)
        }

        ("POST", "/snapshot/generate") => {
            require_session(db, &session_token)?;
            let options = SnapshotOptions {
                preserve_annotations: cfg.preserve_annotations,
            };
            snapshot::generate_and_save(db, today(), &options)?;
            redirect_response("/dashboard")
        }

        ("POST", "/data/update") => {
            require_session(db, &session_token)?;
            let api = OrderApi::new(cfg.api.clone())?;
            sync::update_data(db, &api, today())?;
            redirect_response("/dashboard")
        }

        ("POST", "/messages/mark") => {
            require_session(db, &session_token)?;
            let form = parse_pairs(&read_body(body)?);
            let ids: Vec<String> = form
                .iter()
                .filter(|(k, _)| k == "cnpj")
                .map(|(_, v)| v.clone())
                .collect();
            if !ids.is_empty() {
                snapshot::mark_messages(db, today(), &ids)?;
            }
            redirect_response("/dashboard")
        }

        ("GET", "/export.xlsx") => {
            require_session(db, &session_token)?;
            let (name, rows) = raw_snapshot(db)?;
            export_snapshot_xlsx(&rows, &name)
        }

        ("GET", "/export.csv") => {
            require_session(db, &session_token)?;
            let (name, rows) = raw_snapshot(db)?;
            export_snapshot_csv(&rows, &name)
        }

        _ => Err(ServerError::NotFound),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn require_session(db: &Database, token: &Option<String>) -> Result<(), ServerError> {
    let live = match token {
        Some(token) => db.with_conn(|conn| sessions::session_is_live(conn, token, now_unix()))?,
        None => false,
    };
    if live {
        Ok(())
    } else {
        Err(ServerError::Unauthorized("sign in first".into()))
    }
}

fn raw_snapshot(db: &Database) -> Result<(String, Vec<snapshots::SnapshotRow>), ServerError> {
    let name = snapshots::snapshot_name(snapshot::current_cutoff(today()));
    let rows = snapshots::get(db, &name)?
        .ok_or_else(|| ServerError::MissingInput(format!("snapshot {name} does not exist")))?;
    Ok((name, rows))
}

fn dashboard(db: &Database, query: &[(String, String)]) -> ResultResp {
    let today = today();
    let cutoff = snapshot::current_cutoff(today);

    let Some((_, diffs)) = snapshot::load_current(db, today)? else {
        let history = recent_run_vms(db)?;
        return html_response(no_snapshot_page(&cutoff.to_string(), &history));
    };

    let active = sellers::active_sellers(db)?;
    let whatsapp = clients::whatsapp_index(db)?;

    let selected_seller = lookup(query, "seller").unwrap_or_else(|| "All".to_string());

    // Presentation-only exclusions: rows with no customer id, the "1"
    // placeholder id, non-positive value, or the e-commerce pseudo-seller.
    let visible: Vec<&SnapshotDiff> = diffs
        .iter()
        .filter(|d| !d.customer_id.is_empty() && d.customer_id != "1")
        .filter(|d| d.value > 0.0)
        .filter(|d| d.seller_name.as_deref() != Some(ECOMMERCE_SELLER))
        .filter(|d| match selected_seller.as_str() {
            "All" => true,
            "Unassigned" => !d
                .seller_name
                .as_deref()
                .map(|s| active.iter().any(|a| a == s))
                .unwrap_or(false),
            name => d.seller_name.as_deref() == Some(name),
        })
        .collect();

    let mut groups = Vec::new();
    for (title, key, segments) in OUTREACH_GROUPS {
        let mut members: Vec<&&SnapshotDiff> = visible
            .iter()
            .filter(|d| segments.contains(&d.current_segment))
            .collect();
        members.sort_by(|a, b| b.last_purchase_date.cmp(&a.last_purchase_date));

        let total_rows = members.len();
        let max_page = total_rows.saturating_sub(1) / PAGE_SIZE;
        let page = lookup(query, &format!("pg_{key}"))
            .and_then(|p| p.parse::<usize>().ok())
            .unwrap_or(0)
            .min(max_page);

        let rows = members
            .iter()
            .skip(page * PAGE_SIZE)
            .take(PAGE_SIZE)
            .map(|d| row_vm(d, &whatsapp, today))
            .collect();

        groups.push(GroupVm {
            title,
            key,
            total_rows,
            page,
            max_page,
            rows,
        });
    }

    let segment_counts = Segment::DISPLAY_ORDER
        .iter()
        .map(|seg| {
            let count = visible
                .iter()
                .filter(|d| d.current_segment == *seg)
                .count();
            (seg.label(), count)
        })
        .collect();

    let mut seller_options = vec!["All".to_string()];
    seller_options.extend(active.iter().cloned());
    seller_options.push("Unassigned".to_string());

    let vm = DashboardVm {
        snapshot_day: cutoff.format("%d-%m-%Y").to_string(),
        seller_options,
        selected_seller: selected_seller.clone(),
        base_query: format!("seller={}", url_encode(&selected_seller)),
        groups,
        segment_counts,
        total_customers: visible.len(),
    };

    html_response(dashboard_page(&vm))
}

fn recent_run_vms(db: &Database) -> Result<Vec<RunVm>, ServerError> {
    let vms = runs::recent_runs(db, 5)?
        .into_iter()
        .map(|run| RunVm {
            kind: run.kind,
            started: chrono::DateTime::from_timestamp(run.started_at, 0)
                .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
            outcome: match (run.finished_at, run.success) {
                (None, _) => "running".to_string(),
                (Some(_), true) => format!("ok ({} rows)", run.rows_written.unwrap_or(0)),
                (Some(_), false) => run.error_message.unwrap_or_else(|| "failed".to_string()),
            },
        })
        .collect();
    Ok(vms)
}

fn row_vm(diff: &SnapshotDiff, whatsapp: &HashMap<String, String>, today: NaiveDate) -> RowVm {
    let whatsapp_link = whatsapp
        .get(&diff.customer_id)
        .filter(|number| is_whatsapp_ready(number))
        .map(|number| format!("https://wa.me/{number}"));

    RowVm {
        display_name: diff.display_name.clone(),
        customer_id: diff.customer_id.clone(),
        seller_name: diff.seller_name.clone().unwrap_or_default(),
        recency: diff.recency,
        frequency: diff.frequency,
        value_display: money(diff.value),
        first_purchase: relative_date(diff.first_purchase_date.date(), today),
        last_purchase: relative_date(diff.last_purchase_date.date(), today),
        current_segment: diff.current_segment.label(),
        previous_segment: diff.previous_label(),
        suggested_message: diff.current_segment.suggested_message(),
        whatsapp_link,
        message_sent: diff.message_sent,
    }
}

fn read_body(mut body: astra::Body) -> Result<String, ServerError> {
    let mut out = String::new();
    body.reader()
        .read_to_string(&mut out)
        .map_err(|e| ServerError::BadRequest(format!("unreadable body: {e}")))?;
    Ok(out)
}

/// Parse `k=v&k2=v2` pairs (query string or form body), percent-decoded.
/// Repeated keys are kept; callers pick what they need.
fn parse_pairs(input: &str) -> Vec<(String, String)> {
    input
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let k = url_decode(parts.next().unwrap_or(""));
            let v = url_decode(parts.next().unwrap_or(""));
            (k, v)
        })
        .collect()
}

fn lookup(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
}

fn url_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                if let Ok(byte) = u8::from_str_radix(&input[i + 1..i + 3], 16) {
                    out.push(byte);
                    i += 3;
                } else {
                    out.push(b'%');
                    i += 1;
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn url_encode(input: &str) -> String {
    let mut out = String::new();
    for b in input.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

fn cookie_value(req: &Request, name: &str) -> Option<String> {
    let header = req.headers().get("Cookie")?.to_str().ok()?;
    header.split(';').find_map(|part| {
        let mut kv = part.trim().splitn(2, '=');
        match (kv.next(), kv.next()) {
            (Some(k), Some(v)) if k == name => Some(v.to_string()),
            _ => None,
        }
    })
}
