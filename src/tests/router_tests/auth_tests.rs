use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::router_tests::{body_string, sign_in};
use crate::tests::utils::{init_test_db, test_config};
use astra::Body;
use http::{Method, Request};

#[test]
fn login_page_loads_successfully() {
    let db = init_test_db();
    let cfg = test_config();

    let req = Request::builder()
        .method(Method::GET)
        .uri("/login")
        .body(Body::empty())
        .unwrap();

    let resp = handle(req, &db, &cfg).expect("Handler failed");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Sign in"));
    assert!(body.contains("name=\"password\""));
    assert!(!body.contains("wrong password"));
}

#[test]
fn wrong_password_redirects_back_with_flag() {
    let db = init_test_db();
    let cfg = test_config();

    let req = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .body(Body::from("password=nope"))
        .unwrap();

    let resp = handle(req, &db, &cfg).expect("Handler failed");
    assert_eq!(resp.status(), 302);
    assert_eq!(
        resp.headers().get("Location").unwrap().to_str().unwrap(),
        "/login?failed=1"
    );
    assert!(
        resp.headers().get("Set-Cookie").is_none(),
        "Failed login must not issue a session"
    );
}

#[test]
fn correct_password_issues_a_session_cookie() {
    let db = init_test_db();
    let cfg = test_config();

    let req = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .body(Body::from("password=correct+horse"))
        .unwrap();

    let resp = handle(req, &db, &cfg).expect("Handler failed");
    assert_eq!(resp.status(), 302);
    assert_eq!(
        resp.headers().get("Location").unwrap().to_str().unwrap(),
        "/dashboard"
    );

    let cookie = resp
        .headers()
        .get("Set-Cookie")
        .expect("Login should set a cookie")
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));
}

#[test]
fn dashboard_requires_a_live_session() {
    let db = init_test_db();
    let cfg = test_config();

    let req = Request::builder()
        .method(Method::GET)
        .uri("/dashboard")
        .body(Body::empty())
        .unwrap();

    let err = handle(req, &db, &cfg).expect_err("Dashboard should be gated");
    assert!(matches!(err, ServerError::Unauthorized(_)));
}

#[test]
fn bogus_session_cookie_is_rejected() {
    let db = init_test_db();
    let cfg = test_config();

    let req = Request::builder()
        .method(Method::GET)
        .uri("/export.csv")
        .header("Cookie", "session=not-a-real-token")
        .body(Body::empty())
        .unwrap();

    let err = handle(req, &db, &cfg).expect_err("Export should be gated");
    assert!(matches!(err, ServerError::Unauthorized(_)));
}

#[test]
fn logout_revokes_the_session() {
    let db = init_test_db();
    let cfg = test_config();
    let cookie = sign_in(&db, &cfg);

    // The session works before logout.
    let req = Request::builder()
        .method(Method::GET)
        .uri("/dashboard")
        .header("Cookie", cookie.clone())
        .body(Body::empty())
        .unwrap();
    handle(req, &db, &cfg).expect("Session should be live before logout");

    let req = Request::builder()
        .method(Method::POST)
        .uri("/logout")
        .header("Cookie", cookie.clone())
        .body(Body::empty())
        .unwrap();
    let resp = handle(req, &db, &cfg).expect("Logout failed");
    assert_eq!(resp.status(), 302);

    // And is dead afterwards, even if the client keeps the cookie.
    let req = Request::builder()
        .method(Method::GET)
        .uri("/dashboard")
        .header("Cookie", cookie)
        .body(Body::empty())
        .unwrap();
    let err = handle(req, &db, &cfg).expect_err("Revoked session should fail");
    assert!(matches!(err, ServerError::Unauthorized(_)));
}

#[test]
fn root_redirects_to_dashboard() {
    let db = init_test_db();
    let cfg = test_config();

    let req = Request::builder()
        .method(Method::GET)
        .uri("/")
        .body(Body::empty())
        .unwrap();

    let resp = handle(req, &db, &cfg).expect("Handler failed");
    assert_eq!(resp.status(), 302);
    assert_eq!(
        resp.headers().get("Location").unwrap().to_str().unwrap(),
        "/dashboard"
    );
}

#[test]
fn unknown_routes_return_not_found() {
    let db = init_test_db();
    let cfg = test_config();

    let req = Request::builder()
        .method(Method::GET)
        .uri("/no-such-page")
        .body(Body::empty())
        .unwrap();

    let err = handle(req, &db, &cfg).expect_err("Unknown route should 404");
    assert!(matches!(err, ServerError::NotFound));
}
