//! Page-level tests driving the full router against the in-memory backend

use axum::http::StatusCode;
use serde_json::json;

use crate::support::*;

#[tokio::test]
async fn test_health_check() {
    let backend = FakeBackend::seeded();
    let response = call(app(&backend), get("/health", "")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_guarded_page_without_token_redirects_to_login() {
    let backend = FakeBackend::seeded();

    for uri in ["/peminjaman", "/bukti-peminjaman"] {
        let response = call(app(&backend), get(uri, "")).await;
        assert!(is_redirect(&response), "{} rendered without a token", uri);
        assert_eq!(location(&response), Some("/login"));
        assert!(sets_cookie(&response, "redirectAfterLogin"));
    }
}

#[tokio::test]
async fn test_undecodable_token_is_cleared() {
    let backend = FakeBackend::seeded();
    let response = call(app(&backend), get("/peminjaman", "token=garbage; userId=2")).await;

    assert_eq!(location(&response), Some("/login"));
    assert!(clears_cookie(&response, "token"));
    assert!(clears_cookie(&response, "userId"));
}

#[tokio::test]
async fn test_member_token_on_admin_page_is_unauthorized() {
    let backend = FakeBackend::seeded();
    let member = token_for("user", 2);

    // Gate on adminToken
    let cookies = format!("token={}; adminToken={}", member, member);
    let response = call(app(&backend), get("/admin/dashboard", &cookies)).await;
    assert_eq!(location(&response), Some("/unauthorized"));

    // Gate passes but the page guard checks the session token
    let cookies = format!("token={}; adminToken={}", member, token_for("admin", 1));
    let response = call(app(&backend), get("/admin/loans", &cookies)).await;
    assert_eq!(location(&response), Some("/unauthorized"));
}

#[tokio::test]
async fn test_admin_gate_without_admin_token() {
    let backend = FakeBackend::seeded();
    let cookies = format!("token={}", token_for("admin", 1));
    let response = call(app(&backend), get("/admin/books", &cookies)).await;
    assert_eq!(location(&response), Some("/admin/login"));

    // The admin login page itself is reachable
    let response = call(app(&backend), get("/admin/login", "")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_session_token_reaches_admin_pages() {
    let backend = FakeBackend::seeded();
    let admin = token_for("admin", 1);

    // adminToken missing
    let cookies = format!("token={}; userId=1", admin);
    let (hops, response) = follow_redirects(&backend, "/admin/books", &cookies).await;
    assert_eq!(hops, vec!["/admin/login", "/admin/dashboard"]);
    assert_eq!(response.status(), StatusCode::OK);

    // adminToken undecodable, cleared by the gate
    let cookies = format!("token={}; adminToken=garbage; userId=1", admin);
    let (hops, response) = follow_redirects(&backend, "/admin/loans", &cookies).await;
    assert_eq!(hops, vec!["/admin/login", "/admin/dashboard"]);
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_login_lands_on_dashboard() {
    let backend = FakeBackend::seeded();
    let response = call(
        app(&backend),
        send_json("POST", "/login", "", json!({"email": ADMIN_EMAIL, "password": PASSWORD})),
    )
    .await;

    assert!(is_redirect(&response));
    assert_eq!(location(&response), Some("/admin/dashboard"));
    assert!(sets_cookie(&response, "token"));
    assert!(sets_cookie(&response, "adminToken"));
    assert!(sets_cookie(&response, "userId"));
}

#[tokio::test]
async fn test_member_login_uses_and_consumes_stored_redirect() {
    let backend = FakeBackend::seeded();
    let form = json!({"email": MEMBER_EMAIL, "password": PASSWORD});

    let response = call(app(&backend), send_json("POST", "/login", "", form.clone())).await;
    assert_eq!(location(&response), Some("/peminjaman"));
    assert!(!sets_cookie(&response, "adminToken"));

    let response = call(
        app(&backend),
        send_json("POST", "/login", "redirectAfterLogin=/bukti-peminjaman", form),
    )
    .await;
    assert_eq!(location(&response), Some("/bukti-peminjaman"));
    assert!(clears_cookie(&response, "redirectAfterLogin"));
}

#[tokio::test]
async fn test_member_login_drops_admin_token() {
    let backend = FakeBackend::seeded();
    let admin = token_for("admin", 1);
    let cookies = format!("token={}; adminToken={}", admin, admin);

    let response = call(
        app(&backend),
        send_json("POST", "/login", &cookies, json!({"email": MEMBER_EMAIL, "password": PASSWORD})),
    )
    .await;

    assert_eq!(location(&response), Some("/peminjaman"));
    assert!(sets_cookie(&response, "token"));
    assert!(clears_cookie(&response, "adminToken"));
}

#[tokio::test]
async fn test_stored_redirect_keeps_query_string() {
    let backend = FakeBackend::seeded();
    let response = call(app(&backend), get("/peminjaman?search=laskar", "")).await;
    assert_eq!(location(&response), Some("/login"));
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("redirectAfterLogin=/peminjaman?search=laskar;")));

    let response = call(
        app(&backend),
        send_json(
            "POST",
            "/login",
            "redirectAfterLogin=/peminjaman?search=laskar",
            json!({"email": MEMBER_EMAIL, "password": PASSWORD}),
        ),
    )
    .await;
    assert_eq!(location(&response), Some("/peminjaman?search=laskar"));
}

#[tokio::test]
async fn test_wrong_password_shows_backend_message() {
    let backend = FakeBackend::seeded();
    let response = call(
        app(&backend),
        send_json("POST", "/login", "", json!({"email": MEMBER_EMAIL, "password": "salah"})),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "Login failed. Wrong email or password.");
}

#[tokio::test]
async fn test_login_page_skips_form_with_stored_token() {
    let backend = FakeBackend::seeded();
    let response = call(app(&backend), get("/login", &member_cookies())).await;
    assert_eq!(location(&response), Some("/peminjaman"));

    let response = call(app(&backend), get("/login", "token=garbage")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(clears_cookie(&response, "token"));
}

#[tokio::test]
async fn test_catalog_projects_availability() {
    let backend = FakeBackend::seeded();
    let response = call(app(&backend), get("/peminjaman", &member_cookies())).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let books = body["books"].as_array().unwrap();
    assert_eq!(books.len(), 3);
    assert_eq!(books[0]["status"], "available");
    assert_eq!(books[0]["can_borrow"], true);
    assert_eq!(books[1]["status_color"], "yellow");
    assert_eq!(books[2]["can_borrow"], false);
}

#[tokio::test]
async fn test_borrow_requires_confirmation_then_refetches() {
    let backend = FakeBackend::seeded();

    let response = call(
        app(&backend),
        send_json("POST", "/peminjaman/borrow", &member_cookies(), json!({"bookId": 10})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["confirm"]["id"], 10);
    assert!(backend.transactions().is_empty());

    let response = call(
        app(&backend),
        send_json(
            "POST",
            "/peminjaman/borrow",
            &member_cookies(),
            json!({"bookId": 10, "confirm": true}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let borrowed = body["books"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["id"] == 10)
        .unwrap();
    assert_ne!(borrowed["available"], 2);
    assert_eq!(backend.book(10).unwrap().available, 1);
    assert_eq!(backend.transactions().len(), 1);
}

#[tokio::test]
async fn test_borrow_refuses_unavailable_book() {
    let backend = FakeBackend::seeded();
    let response = call(
        app(&backend),
        send_json(
            "POST",
            "/peminjaman/borrow",
            &member_cookies(),
            json!({"bookId": 11, "confirm": true}),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(backend.transactions().is_empty());
}

#[tokio::test]
async fn test_borrow_without_user_id_redirects_to_login() {
    let backend = FakeBackend::seeded();
    let cookies = format!("token={}; userId=abc", token_for("user", 2));
    let response = call(
        app(&backend),
        send_json("POST", "/peminjaman/borrow", &cookies, json!({"bookId": 10, "confirm": true})),
    )
    .await;

    assert_eq!(location(&response), Some("/login"));
    assert!(backend.transactions().is_empty());
}

#[tokio::test]
async fn test_confirm_then_complete_loan() {
    let backend = FakeBackend::seeded();
    let id = backend.push_pending(2, 10);

    let response = call(
        app(&backend),
        send_json("POST", &format!("/admin/loans/{}/confirm", id), &admin_cookies(), json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["transactions"][0]["status"], "borrowed");
    assert_eq!(body["transactions"][0]["action"], "complete");

    // Confirm is no longer allowed
    let response = call(
        app(&backend),
        send_json("POST", &format!("/admin/loans/{}/confirm", id), &admin_cookies(), json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = call(
        app(&backend),
        send_json("POST", &format!("/admin/loans/{}/complete", id), &admin_cookies(), json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.book(10).unwrap().available, 2);
}

#[tokio::test]
async fn test_proof_of_borrowing_lists_own_loans() {
    let backend = FakeBackend::seeded();
    backend.push_pending(2, 10);
    backend.push_pending(1, 12);

    let response = call(app(&backend), get("/bukti-peminjaman", &member_cookies())).await;
    let body = json_body(response).await;
    let rows = body["transactions"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["book_title"], "Laskar Pelangi");
    assert!(rows[0]["action"].is_null());
}

#[tokio::test]
async fn test_dashboard_reports_new_transaction() {
    let backend = FakeBackend::seeded();
    let first = backend.push_pending(2, 10);
    backend.push_pending(2, 12);

    let response = call(
        app(&backend),
        get(&format!("/admin/dashboard?period=monthly&last_seen={}", first), &admin_cookies()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["counts"]["members"]["users"], 1);
    assert_eq!(body["counts"]["transactions"], 2);
    assert_eq!(body["period"], "monthly");
    assert_eq!(body["selected_report"]["labels"][0], "monthly");
    assert_eq!(body["banner"]["transaction_id"], 2);
    assert_eq!(body["latest_transaction_id"], 2);
}

#[tokio::test]
async fn test_admin_member_search_and_registration() {
    let backend = FakeBackend::seeded();

    let response = call(
        app(&backend),
        send_json(
            "POST",
            "/register",
            "",
            json!({
                "nama": "Citra",
                "email": "citra@kampus.ac.id",
                "nim": "2102",
                "fakultas": "Hukum",
                "password": "p"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = call(app(&backend), get("/admin/users?search=hukum", &admin_cookies())).await;
    let body = json_body(response).await;
    let members = body["members"].as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["role"], "user");
}

#[tokio::test]
async fn test_session_summary() {
    let backend = FakeBackend::seeded();

    let body = json_body(call(app(&backend), get("/session", "")).await).await;
    assert_eq!(body["logged_in"], false);

    let body = json_body(call(app(&backend), get("/session", &member_cookies())).await).await;
    assert_eq!(body["logged_in"], true);
    assert_eq!(body["role"], "user");
    assert_eq!(body["user_id"], 2);

    let body = json_body(call(app(&backend), get("/session", "token=garbage")).await).await;
    assert_eq!(body["logged_in"], false);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let backend = FakeBackend::seeded();
    let response = call(
        app(&backend),
        send_json("POST", "/logout", &admin_cookies(), json!({})),
    )
    .await;

    assert_eq!(location(&response), Some("/login"));
    assert!(clears_cookie(&response, "token"));
    assert!(clears_cookie(&response, "adminToken"));
}

#[tokio::test]
async fn test_backend_login_is_callable_directly() {
    use pustaka_portal::gateway::LibraryGateway;

    let backend = FakeBackend::seeded();
    let token = tokio_test::assert_ok!(backend.login(ADMIN_EMAIL, PASSWORD).await);
    assert!(!token.is_empty());
    tokio_test::assert_err!(backend.login(ADMIN_EMAIL, "salah").await);
}
