//! Router tests against the in-process cache provider.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use stash_config::{CacheConfig, CacheProvider, ServerConfig};
use stash_server::{
    di::{build_app_state, build_module},
    rest::create_router,
};
use tower::ServiceExt;

fn test_router(provider: CacheProvider) -> Router {
    let cache = CacheConfig {
        provider,
        ..Default::default()
    };
    let module = build_module(&cache).unwrap();
    create_router(build_app_state(&module, &cache), &ServerConfig::default())
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_ann(router: &Router) -> i64 {
    let (status, body) = send(
        router,
        "POST",
        "/api/v1/users",
        Some(json!({ "username": "ann", "name": "Ann" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health() {
    let router = test_router(CacheProvider::Memory);
    let (status, body) = send(&router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_second_read_is_a_cache_hit() {
    let router = test_router(CacheProvider::Memory);
    let id = create_ann(&router).await;
    let uri = format!("/api/v1/users/{id}");

    let (status, first) = send(&router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = send(&router, "GET", &uri, None).await;
    assert_eq!(first, second);
    assert_eq!(second["data"]["name"], "Ann");

    let (status, stats) = send(&router, "GET", "/api/v1/cache/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["data"]["backend"], "memory");
    assert_eq!(stats["data"]["hits"], 1);
    assert_eq!(stats["data"]["misses"], 1);
    assert_eq!(stats["data"]["populates"], 1);
    assert_eq!(stats["data"]["hitRate"], 0.5);
}

#[tokio::test]
async fn test_update_is_visible_immediately() {
    let router = test_router(CacheProvider::Memory);
    let id = create_ann(&router).await;
    let uri = format!("/api/v1/users/{id}");
    send(&router, "GET", &uri, None).await;

    let (status, _) = send(&router, "PUT", &uri, Some(json!({ "name": "Annie" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&router, "GET", &uri, None).await;
    assert_eq!(body["data"]["name"], "Annie");
    let (_, body) = send(&router, "GET", "/api/v1/users/by-username/ANN", None).await;
    assert_eq!(body["data"]["name"], "Annie");
}

#[tokio::test]
async fn test_exists_flips_after_create_and_delete() {
    let router = test_router(CacheProvider::Memory);

    let (_, body) = send(&router, "GET", "/api/v1/users/exists/ann", None).await;
    assert_eq!(body["data"]["exists"], false);

    let id = create_ann(&router).await;
    let (_, body) = send(&router, "GET", "/api/v1/users/exists/ann", None).await;
    assert_eq!(body["data"]["exists"], true);

    let (status, _) = send(&router, "DELETE", &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&router, "GET", "/api/v1/users/exists/ann", None).await;
    assert_eq!(body["data"]["exists"], false);
    let (status, _) = send(&router, "GET", &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_responses() {
    let router = test_router(CacheProvider::Memory);

    let (status, body) = send(&router, "GET", "/api/v1/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(&router, "GET", "/api/v1/users/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    create_ann(&router).await;
    let (status, body) = send(
        &router,
        "POST",
        "/api/v1/users",
        Some(json!({ "username": "Ann", "name": "Other" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_disabled_cache_still_serves_reads() {
    let router = test_router(CacheProvider::None);
    let id = create_ann(&router).await;
    let uri = format!("/api/v1/users/{id}");

    for _ in 0..2 {
        let (status, body) = send(&router, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["username"], "ann");
    }

    let (_, stats) = send(&router, "GET", "/api/v1/cache/stats", None).await;
    assert_eq!(stats["data"]["enabled"], false);
    assert_eq!(stats["data"]["hits"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint_renders() {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .build_recorder()
        .handle();
    let router = stash_server::rest::with_metrics_endpoint(test_router(CacheProvider::Memory), handle);

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
