use crate::router::handle;
use crate::tests::router_tests::{body_string, generate_snapshot, seed_history, sign_in};
use crate::tests::utils::{init_test_db, test_config};
use astra::Body;
use http::{Method, Request};

#[test]
fn dashboard_without_snapshot_offers_manual_operations() {
    let db = init_test_db();
    let cfg = test_config();
    let cookie = sign_in(&db, &cfg);

    let req = Request::builder()
        .method(Method::GET)
        .uri("/dashboard")
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap();

    let resp = handle(req, &db, &cfg).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("does not exist yet"));
    assert!(body.contains("/snapshot/generate"));
    assert!(body.contains("/data/update"));
}

#[test]
fn failed_generation_shows_up_in_run_history() {
    let db = init_test_db();
    let cfg = test_config();
    let cookie = sign_in(&db, &cfg);

    // No orders seeded, so generation fails and the run is recorded.
    let req = Request::builder()
        .method(Method::POST)
        .uri("/snapshot/generate")
        .header("Cookie", cookie.clone())
        .body(Body::empty())
        .unwrap();
    handle(req, &db, &cfg).expect_err("Generation without orders should fail");

    let req = Request::builder()
        .method(Method::GET)
        .uri("/dashboard")
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap();
    let body = body_string(handle(req, &db, &cfg).expect("Handler failed"));

    assert!(body.contains("Recent runs"));
    assert!(body.contains("no order history"));
}

#[test]
fn dashboard_lists_customers_after_generation() {
    let db = init_test_db();
    let cfg = test_config();
    seed_history(&db);
    let cookie = sign_in(&db, &cfg);
    generate_snapshot(&db, &cfg, &cookie);

    let req = Request::builder()
        .method(Method::GET)
        .uri("/dashboard")
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap();

    let resp = handle(req, &db, &cfg).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Outreach by segment"));
    assert!(body.contains("Acme Ltda"));
    assert!(body.contains("Rio Parts SA"));
    assert!(body.contains("Customers per segment"));
    // A valid 13-digit number renders as an outreach link.
    assert!(body.contains("wa.me/5511987654321"));
    // First-time customers show the sentinel as their previous segment.
    assert!(body.contains("No History"));
}

#[test]
fn seller_filter_narrows_the_listing() {
    let db = init_test_db();
    let cfg = test_config();
    seed_history(&db);
    let cookie = sign_in(&db, &cfg);
    generate_snapshot(&db, &cfg, &cookie);

    let req = Request::builder()
        .method(Method::GET)
        .uri("/dashboard?seller=Ana")
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap();

    let resp = handle(req, &db, &cfg).expect("Handler failed");
    let body = body_string(resp);

    assert!(body.contains("Acme Ltda"), "Ana's customer should be listed");
    assert!(
        !body.contains("Rio Parts SA"),
        "Beto's customer should be filtered out"
    );
}

#[test]
fn unassigned_filter_shows_only_inactive_sellers() {
    let db = init_test_db();
    let cfg = test_config();
    seed_history(&db);

    // Beto left the company; his customers become "Unassigned".
    crate::db::sellers::upsert_seller(&db, "Beto", "inactive").unwrap();

    let cookie = sign_in(&db, &cfg);
    generate_snapshot(&db, &cfg, &cookie);

    let req = Request::builder()
        .method(Method::GET)
        .uri("/dashboard?seller=Unassigned")
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap();

    let resp = handle(req, &db, &cfg).expect("Handler failed");
    let body = body_string(resp);

    assert!(body.contains("Rio Parts SA"));
    assert!(!body.contains("Acme Ltda"));
}
