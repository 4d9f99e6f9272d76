//! Integration tests for the HTTP API

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use faultline::api::{build_router, AppState};
use faultline::config::TrackingConfig;
use faultline::db::ErrorStore;

async fn test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("errors.db");
    let store = ErrorStore::open(path.to_str().unwrap(), &TrackingConfig::default())
        .await
        .unwrap();
    (build_router(AppState::new(store)), dir)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn log_one(app: &Router, category: &str, error_type: &str, message: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/log-error",
            json!({
                "category": category,
                "error_type": error_type,
                "error_message": message,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listing = json_body(
        app.clone()
            .oneshot(get("/api/errors?include_resolved=true"))
            .await
            .unwrap(),
    )
    .await;
    listing["errors"][0]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = test_app().await;

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_log_error_and_list() {
    let (app, _dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/log-error",
            json!({
                "category": "api",
                "error_type": "Timeout",
                "error_message": "Request timed out",
                "extra_data": {"url": "https://api.example.com/users", "status": 504},
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["success"], json!(true));

    let body = json_body(app.clone().oneshot(get("/api/errors")).await.unwrap()).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    assert_eq!(body["errors"][0]["error_type"], json!("Timeout"));
    assert_eq!(body["stats"]["total_errors"], json!(1));
    assert_eq!(body["categories"]["api"], json!("API"));
}

#[tokio::test]
async fn test_log_error_defaults() {
    let (app, _dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/api/log-error", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(app.clone().oneshot(get("/api/errors")).await.unwrap()).await;
    assert_eq!(body["errors"][0]["category"], json!("server"));
    assert_eq!(body["errors"][0]["error_type"], json!("Error"));
    assert_eq!(body["errors"][0]["error_message"], json!("Unknown error"));
}

#[tokio::test]
async fn test_detail_and_not_found() {
    let (app, _dir) = test_app().await;
    let id = log_one(&app, "api", "Timeout", "Request timed out").await;

    let response = app
        .clone()
        .oneshot(get(&format!("/api/errors/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["error"]["occurrence_count"], json!(1));
    assert_eq!(body["error"]["category_label"], json!("API"));
    assert_eq!(body["error"]["occurrences"].as_array().unwrap().len(), 1);

    let response = app.clone().oneshot(get("/api/errors/9999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Error not found"));
}

#[tokio::test]
async fn test_dedup_over_http() {
    let (app, _dir) = test_app().await;

    let first = log_one(&app, "api", "Timeout", "Request timed out").await;
    let second = log_one(&app, "api", "Timeout", "Request timed out").await;
    assert_eq!(first, second);

    let body = json_body(
        app.clone()
            .oneshot(get(&format!("/api/errors/{first}")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["error"]["occurrence_count"], json!(2));
}

#[tokio::test]
async fn test_resolve_and_clear_resolved() {
    let (app, _dir) = test_app().await;
    let id = log_one(&app, "api", "Timeout", "Request timed out").await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/errors/{id}/resolve"),
            json!({"notes": "Fixed it"}),
        ))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["success"], json!(true));

    let body = json_body(
        app.clone()
            .oneshot(get(&format!("/api/errors/{id}")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["error"]["resolved"], json!(true));
    assert_eq!(body["error"]["resolution_notes"], json!("Fixed it"));

    let response = app
        .clone()
        .oneshot(post_json("/api/errors/clear-resolved", json!({})))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["cleared"], json!(1));
}

#[tokio::test]
async fn test_note_requires_text() {
    let (app, _dir) = test_app().await;
    let id = log_one(&app, "api", "Timeout", "Request timed out").await;

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/errors/{id}/note"),
            json!({"note": "   "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Note is required"));

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/errors/{id}/note"),
            json!({"note": "checking logs"}),
        ))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["success"], json!(true));

    // The note does not resolve the group
    let body = json_body(
        app.clone()
            .oneshot(get(&format!("/api/errors/{id}")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["error"]["resolved"], json!(false));
}

#[tokio::test]
async fn test_delete_error() {
    let (app, _dir) = test_app().await;
    let id = log_one(&app, "api", "Timeout", "Request timed out").await;

    let response = app
        .clone()
        .oneshot(delete(&format!("/api/errors/{id}")))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["success"], json!(true));

    let response = app
        .clone()
        .oneshot(delete(&format!("/api/errors/{id}")))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["success"], json!(false));
}

#[tokio::test]
async fn test_debug_report_endpoint() {
    let (app, _dir) = test_app().await;
    let id = log_one(&app, "api", "HTTPError", "404 Not Found").await;

    let response = app
        .clone()
        .oneshot(get(&format!("/api/errors/{id}/debug-report")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], json!(true));
    let report = body["debug_code"].as_str().unwrap();
    assert!(report.contains("## Error Debug Report"));
    assert!(report.contains("HTTPError"));
}

#[tokio::test]
async fn test_frontend_batch_ingest() {
    let (app, _dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/log-frontend-error",
            json!({
                "errors": [
                    {
                        "error_type": "TypeError",
                        "error_message": "undefined is not a function",
                        "page_url": "https://example.com/checkout",
                        "user_agent": "TestBrowser/1.0",
                        "console_logs": [{"type": "error", "text": "boom"}],
                    },
                    {
                        "error_type": "NetworkError",
                        "error_message": "fetch failed",
                        "request_url": "https://example.com/api/cart",
                        "http_status": 502,
                    },
                ],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["logged"], json!(2));

    let body = json_body(
        app.clone()
            .oneshot(get("/api/errors?category=frontend"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_stats_endpoint_is_raw() {
    let (app, _dir) = test_app().await;
    log_one(&app, "database", "E1", "m1").await;
    log_one(&app, "api", "E2", "m2").await;

    let response = app.clone().oneshot(get("/api/errors/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    // Raw stats payload, no envelope
    assert!(body.get("success").is_none());
    assert_eq!(body["total_errors"], json!(2));
    assert_eq!(body["unresolved_errors"], json!(2));
    assert_eq!(body["by_category"].as_array().unwrap().len(), 2);
    assert_eq!(body["by_category"][0]["count"], json!(1));
    assert_eq!(body["by_category"][1]["count"], json!(1));
}

#[tokio::test]
async fn test_list_category_all_means_no_filter() {
    let (app, _dir) = test_app().await;
    log_one(&app, "database", "E1", "m1").await;
    log_one(&app, "api", "E2", "m2").await;

    let body = json_body(
        app.clone()
            .oneshot(get("/api/errors?category=all"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["errors"].as_array().unwrap().len(), 2);
}
