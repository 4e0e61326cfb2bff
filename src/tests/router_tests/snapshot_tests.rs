use crate::db::snapshots;
use crate::domain::transition::NO_HISTORY_LABEL;
use crate::router::handle;
use crate::tests::router_tests::{
    body_string, current_cutoff, generate_snapshot, seed_history, sign_in,
};
use crate::tests::utils::{init_test_db, test_config};
use astra::Body;
use http::{Method, Request};

#[test]
fn generation_persists_first_time_rows_with_the_sentinel() {
    let db = init_test_db();
    let cfg = test_config();
    seed_history(&db);
    let cookie = sign_in(&db, &cfg);
    generate_snapshot(&db, &cfg, &cookie);

    let name = snapshots::snapshot_name(current_cutoff());
    let rows = snapshots::get(&db, &name)
        .expect("Blob lookup failed")
        .expect("Snapshot blob should exist after generation");
    assert_eq!(rows.len(), 2);

    let acme = rows
        .iter()
        .find(|r| r.cnpj == "12345678000199")
        .expect("Seeded customer should be in the snapshot");
    assert_eq!(acme.name, "Acme Ltda");
    assert_eq!(acme.seller_name, "Ana");
    assert_eq!(acme.frequency, "2");
    assert_eq!(acme.value, "1500.00");
    // No previous month on record.
    assert_eq!(acme.m1_segment, NO_HISTORY_LABEL);
    assert_eq!(acme.prev_recency, "");
    assert_eq!(acme.changed, "true");
    assert_eq!(acme.change_value, "0.00");
    assert_eq!(acme.message_sent, "false");
}

#[test]
fn generation_without_orders_is_rejected() {
    let db = init_test_db();
    let cfg = test_config();
    let cookie = sign_in(&db, &cfg);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/snapshot/generate")
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap();

    let err = handle(req, &db, &cfg).expect_err("Empty history should be rejected");
    assert!(matches!(err, crate::errors::ServerError::MissingInput(_)));
}

#[test]
fn marking_messages_persists_through_the_blob() {
    let db = init_test_db();
    let cfg = test_config();
    seed_history(&db);
    let cookie = sign_in(&db, &cfg);
    generate_snapshot(&db, &cfg, &cookie);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/messages/mark")
        .header("Cookie", cookie)
        .body(Body::from("cnpj=12345678000199"))
        .unwrap();

    let resp = handle(req, &db, &cfg).expect("Mark failed");
    assert_eq!(resp.status(), 302);

    let name = snapshots::snapshot_name(current_cutoff());
    let rows = snapshots::get(&db, &name).unwrap().unwrap();

    let acme = rows.iter().find(|r| r.cnpj == "12345678000199").unwrap();
    assert_eq!(acme.message_sent, "true");

    let other = rows.iter().find(|r| r.cnpj == "98765432000155").unwrap();
    assert_eq!(other.message_sent, "false", "Unchecked rows stay unmarked");
}

#[test]
fn regeneration_discards_annotations_by_default() {
    let db = init_test_db();
    let cfg = test_config();
    seed_history(&db);
    let cookie = sign_in(&db, &cfg);
    generate_snapshot(&db, &cfg, &cookie);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/messages/mark")
        .header("Cookie", cookie.clone())
        .body(Body::from("cnpj=12345678000199"))
        .unwrap();
    handle(req, &db, &cfg).expect("Mark failed");

    generate_snapshot(&db, &cfg, &cookie);

    let name = snapshots::snapshot_name(current_cutoff());
    let rows = snapshots::get(&db, &name).unwrap().unwrap();
    let acme = rows.iter().find(|r| r.cnpj == "12345678000199").unwrap();
    assert_eq!(acme.message_sent, "false");
}

#[test]
fn regeneration_can_preserve_annotations_when_configured() {
    let db = init_test_db();
    let mut cfg = test_config();
    cfg.preserve_annotations = true;
    seed_history(&db);
    let cookie = sign_in(&db, &cfg);
    generate_snapshot(&db, &cfg, &cookie);

    let req = Request::builder()
        .method(Method::POST)
        .uri("/messages/mark")
        .header("Cookie", cookie.clone())
        .body(Body::from("cnpj=12345678000199"))
        .unwrap();
    handle(req, &db, &cfg).expect("Mark failed");

    generate_snapshot(&db, &cfg, &cookie);

    let name = snapshots::snapshot_name(current_cutoff());
    let rows = snapshots::get(&db, &name).unwrap().unwrap();
    let acme = rows.iter().find(|r| r.cnpj == "12345678000199").unwrap();
    assert_eq!(acme.message_sent, "true");
}

#[test]
fn csv_export_streams_the_current_snapshot() {
    let db = init_test_db();
    let cfg = test_config();
    seed_history(&db);
    let cookie = sign_in(&db, &cfg);
    generate_snapshot(&db, &cfg, &cookie);

    let req = Request::builder()
        .method(Method::GET)
        .uri("/export.csv")
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap();

    let resp = handle(req, &db, &cfg).expect("Export failed");
    assert_eq!(resp.status(), 200);
    assert!(resp
        .headers()
        .get("Content-Type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let body = body_string(resp);
    assert!(body.starts_with("name,cnpj,seller_name"));
    assert!(body.contains("12345678000199"));
    assert!(body.contains(NO_HISTORY_LABEL));
}

#[test]
fn xlsx_export_requires_an_existing_snapshot() {
    let db = init_test_db();
    let cfg = test_config();
    let cookie = sign_in(&db, &cfg);

    let req = Request::builder()
        .method(Method::GET)
        .uri("/export.xlsx")
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap();

    let err = handle(req, &db, &cfg).expect_err("Export without snapshot should fail");
    assert!(matches!(err, crate::errors::ServerError::MissingInput(_)));
}
