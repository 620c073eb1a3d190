mod common;

use axum::http::{StatusCode, header};
use serde_json::{Value, json};
use sqlx::PgPool;

use common::TestApp;

#[tokio::test]
async fn test_redirect_uses_307_with_stored_url() {
    let app = TestApp::new();
    let token = app.token_for("u1");
    let server = app.server();

    server
        .post("/api/links")
        .authorization_bearer(&token)
        .json(&json!({ "url": "https://example.com/a?b=c#d", "short_code": "demo" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get("/demo").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header(header::LOCATION),
        "https://example.com/a?b=c#d"
    );
}

#[tokio::test]
async fn test_redirect_needs_no_token() {
    let app = TestApp::new();
    let token = app.token_for("u1");
    let server = app.server();

    server
        .post("/api/links")
        .authorization_bearer(&token)
        .json(&json!({ "url": "https://example.com", "short_code": "public" }))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .get("/public")
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);
}

#[tokio::test]
async fn test_redirect_unknown_code() {
    let app = TestApp::new();

    let response = app.server().get("/nothing-here").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "Link not found");
}

#[tokio::test]
async fn test_redirect_malformed_code_skips_storage() {
    let app = TestApp::new();
    let server = app.server();

    for path in ["/ab", "/de@mo", "/abcdefghijklmnopqrstu"] {
        server.get(path).await.assert_status(StatusCode::NOT_FOUND);
    }

    assert_eq!(app.links.calls(), 0);
}

#[tokio::test]
async fn test_redirect_storage_failure_is_generic_500() {
    let app = TestApp::new();
    app.links.break_storage();

    let response = app.server().get("/demo").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.text();
    assert_eq!(body, "Internal server error");
    assert!(!body.contains("connection refused"));
}

#[tokio::test]
async fn test_redirect_fills_cache() {
    let app = TestApp::new();
    let token = app.token_for("u1");
    let server = app.server();

    server
        .post("/api/links")
        .authorization_bearer(&token)
        .json(&json!({ "url": "https://example.com", "short_code": "cached" }))
        .await
        .assert_status(StatusCode::CREATED);

    assert!(app.cache.get("cached").is_none());

    server
        .get("/cached")
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);

    assert_eq!(app.cache.get("cached").as_deref(), Some("https://example.com"));
}

#[tokio::test]
async fn test_redirect_after_update_sees_new_url() {
    let app = TestApp::new();
    let token = app.token_for("u1");
    let server = app.server();

    let id = server
        .post("/api/links")
        .authorization_bearer(&token)
        .json(&json!({ "url": "https://example.com", "short_code": "demo" }))
        .await
        .json::<Value>()["id"]
        .as_i64()
        .unwrap();

    // Warm the cache with the old destination.
    server.get("/demo").await;

    server
        .put(&format!("/api/links/{id}"))
        .authorization_bearer(&token)
        .json(&json!({ "url": "https://example.org", "short_code": "demo" }))
        .await
        .assert_status_ok();

    let response = server.get("/demo").await;
    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header(header::LOCATION), "https://example.org");
}

#[tokio::test]
async fn test_redirect_old_code_after_rename() {
    let app = TestApp::new();
    let token = app.token_for("u1");
    let server = app.server();

    let id = server
        .post("/api/links")
        .authorization_bearer(&token)
        .json(&json!({ "url": "https://example.com", "short_code": "before" }))
        .await
        .json::<Value>()["id"]
        .as_i64()
        .unwrap();

    server.get("/before").await;

    server
        .put(&format!("/api/links/{id}"))
        .authorization_bearer(&token)
        .json(&json!({ "url": "https://example.com", "short_code": "after" }))
        .await
        .assert_status_ok();

    server.get("/before").await.assert_status(StatusCode::NOT_FOUND);
    server
        .get("/after")
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);
}

#[sqlx::test]
async fn test_redirect_from_postgres(pool: PgPool) {
    common::insert_link(&pool, "u1", "pgdemo", "https://example.com/pg").await;

    let state = common::create_pg_state(pool);
    let server =
        axum_test::TestServer::new(link_registry::routes::service_router(state)).unwrap();

    let response = server.get("/pgdemo").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header(header::LOCATION), "https://example.com/pg");

    server.get("/missing").await.assert_status(StatusCode::NOT_FOUND);
}
