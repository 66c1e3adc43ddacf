//! HTTP facade tests: routing, status mapping, CORS, and JSON envelopes.

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use moneta::server;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_router() -> Router {
    let (dir, svc) = common::service();
    // The store file lives for the whole test process.
    std::mem::forget(dir);
    server::router(Arc::new(svc))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn post_json(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let router = test_router();
    let (status, body) = send(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_add_and_get_memory() {
    let router = test_router();

    let (status, body) = send(
        &router,
        post_json(
            "/memory",
            json!({"content": "served memory", "project": "api", "type": "pattern"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["project"], "api");
    assert_eq!(body["type"], "pattern");
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(&router, get(&format!("/memory/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "served memory");
    // Embeddings never travel over the wire.
    assert!(body.get("embedding").is_none());
}

#[tokio::test]
async fn test_get_missing_memory_is_404() {
    let router = test_router();
    let (status, body) = send(&router, get("/memory/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_add_empty_content_is_400() {
    let router = test_router();
    let (status, body) = send(
        &router,
        post_json("/memory", json!({"content": "", "project": "api"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let router = test_router();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_method_on_known_path_is_405() {
    let router = test_router();
    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/search")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_search_flow() {
    let router = test_router();
    send(
        &router,
        post_json("/memory", json!({"content": "find me later", "project": "api"})),
    )
    .await;

    let (status, body) = send(
        &router,
        post_json("/search", json!({"query": "find me later", "project": "api"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert!(body["timing_ms"].is_number());
    let similarity = body["results"][0]["similarity"].as_f64().unwrap();
    assert!(similarity > 0.99);
}

#[tokio::test]
async fn test_delete_memory() {
    let router = test_router();
    let (_, body) = send(
        &router,
        post_json("/memory", json!({"content": "to delete", "project": "api"})),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/memory/{id}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    let (status, _) = send(&router, get(&format!("/memory/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_and_projects() {
    let router = test_router();
    send(
        &router,
        post_json("/memory", json!({"content": "x", "project": "p1"})),
    )
    .await;
    send(
        &router,
        post_json("/memory", json!({"content": "y", "project": "p2"})),
    )
    .await;

    let (status, body) = send(&router, get("/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_memories"], 2);
    assert_eq!(body["embedding_model"], "stub-embedder");

    let (status, body) = send(&router, get("/projects")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["projects"], json!(["p1", "p2"]));
}

#[tokio::test]
async fn test_cors_preflight() {
    let router = test_router();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/memory")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert!(headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("POST"))
        .unwrap_or(false));
}
