mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;
use sqlx::PgPool;

use common::TestApp;
use link_registry::routes::service_router;

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = TestApp::new();

    let response = app.server().get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["message"], "memory");
    assert!(json.get("version").is_some());
}

#[tokio::test]
async fn test_health_database_down() {
    let app = TestApp::new();
    app.links.break_storage();

    let response = app.server().get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["database"]["status"], "error");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
}

#[tokio::test]
async fn test_health_cache_down() {
    let app = TestApp::new();
    app.cache.fail_writes();

    let response = app.server().get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<Value>();
    assert_eq!(json["checks"]["cache"]["status"], "error");
}

#[sqlx::test]
async fn test_health_endpoint_postgres(pool: PgPool) {
    let state = common::create_pg_state(pool);
    let server = TestServer::new(service_router(state)).unwrap();

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["message"], "disabled");
}
