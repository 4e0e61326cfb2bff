mod auth_tests;
mod dashboard_tests;
mod snapshot_tests;

use crate::config::AppConfig;
use crate::db::clients::{self, ClientRow};
use crate::db::connection::Database;
use crate::db::{orders, sellers};
use crate::router::handle;
use crate::snapshot;
use crate::tests::utils::stored_order;
use astra::Body;
use chrono::{Duration, Local, NaiveDate};
use http::{Method, Request};
use std::io::Read;

/// Sign in through the real login route and return the `session=...` cookie.
pub fn sign_in(db: &Database, cfg: &AppConfig) -> String {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .body(Body::from("password=correct+horse"))
        .unwrap();

    let resp = handle(req, db, cfg).expect("Login failed");
    assert_eq!(resp.status(), 302, "Login should redirect");

    let set_cookie = resp
        .headers()
        .get("Set-Cookie")
        .expect("Login should set a cookie")
        .to_str()
        .unwrap();
    set_cookie
        .split(';')
        .next()
        .expect("Cookie should have a value")
        .to_string()
}

pub fn body_string(resp: astra::Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

/// The routes always snapshot the month that ended before the real "today",
/// so seeded orders are dated relative to the current cutoff.
pub fn current_cutoff() -> NaiveDate {
    snapshot::current_cutoff(Local::now().date_naive())
}

/// Two customers with orders inside the current snapshot window and nothing
/// before it, so both come out as first-time ("No History") rows.
pub fn seed_history(db: &Database) {
    let cutoff = current_cutoff();
    let day = |back: i64, time: &str| format!("{} {time}", cutoff - Duration::days(back));

    let seeded = vec![
        stored_order("ord-1", "12345678000199", Some("Ana"), &day(20, "10:00:00"), "900.00"),
        stored_order("ord-2", "12345678000199", Some("Ana"), &day(3, "14:30:00"), "600.00"),
        stored_order("ord-3", "98765432000155", Some("Beto"), &day(8, "09:00:00"), "250.00"),
    ];
    orders::upsert_orders(db, &seeded, 0).expect("Failed to seed orders");

    clients::upsert_clients(
        db,
        &[
            ClientRow {
                customer_id: "12345678000199".to_string(),
                display_name: "Acme Ltda".to_string(),
                whatsapp: "5511987654321".to_string(),
            },
            ClientRow {
                customer_id: "98765432000155".to_string(),
                display_name: "Rio Parts SA".to_string(),
                whatsapp: String::new(),
            },
        ],
        0,
    )
    .expect("Failed to seed clients");

    sellers::upsert_seller(db, "Ana", "active").expect("Failed to seed seller");
    sellers::upsert_seller(db, "Beto", "active").expect("Failed to seed seller");
}

pub fn generate_snapshot(db: &Database, cfg: &AppConfig, cookie: &str) {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/snapshot/generate")
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap();
    let resp = handle(req, db, cfg).expect("Snapshot generation failed");
    assert_eq!(resp.status(), 302, "Generation should redirect back");
}
