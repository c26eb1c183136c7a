use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use signing_service::crypto::RsaKeyGenerator;
use signing_service::{AlgorithmRegistry, AppState, SigningService, router};
use tower::ServiceExt;

fn test_state() -> AppState {
    let registry = AlgorithmRegistry::with_defaults(RsaKeyGenerator::insecure(1024));
    AppState {
        service: Arc::new(SigningService::in_memory(registry)),
    }
}

async fn send(app: axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_returns_pass() {
    let app = router(test_state());

    let (status, body) = send(app, "GET", "/api/v0/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "data": { "status": "pass", "version": "v0" } }));
}

#[tokio::test]
async fn create_get_and_list_devices() {
    let app = router(test_state());

    let (status, body) = send(
        app.clone(),
        "POST",
        "/api/v0/devices",
        Some(json!({ "id": "device-1", "algorithm": "ECDSA", "label": "Front desk" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({ "data": {
            "id": "device-1",
            "algorithm": "ECDSA",
            "label": "Front desk",
            "signature_counter": 0,
        } })
    );

    let (status, body) = send(app.clone(), "GET", "/api/v0/devices/device-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], "device-1");

    let (status, body) = send(app, "GET", "/api/v0/devices", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn create_without_id_generates_one() {
    let app = router(test_state());

    let (status, body) = send(app, "POST", "/api/v0/devices", Some(json!({ "algorithm": "RSA" }))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(!body["data"]["id"].as_str().unwrap().is_empty());
    assert!(body["data"].get("label").is_none());
}

#[tokio::test]
async fn create_rejects_unknown_algorithm() {
    let app = router(test_state());

    let (status, body) = send(app, "POST", "/api/v0/devices", Some(json!({ "algorithm": "DSA" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0].as_str().unwrap().contains("DSA"));
}

#[tokio::test]
async fn create_rejects_duplicate_id() {
    let app = router(test_state());
    let request = json!({ "id": "dup", "algorithm": "ECDSA" });

    let (status, _) = send(app.clone(), "POST", "/api/v0/devices", Some(request.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(app, "POST", "/api/v0/devices", Some(request)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_rejects_malformed_body() {
    let app = router(test_state());

    let (status, body) = send(app, "POST", "/api/v0/devices", Some(json!({ "label": "no algorithm" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"].is_array());
}

#[tokio::test]
async fn sign_chains_signatures() {
    let app = router(test_state());
    send(
        app.clone(),
        "POST",
        "/api/v0/devices",
        Some(json!({ "id": "X", "algorithm": "RSA" })),
    )
    .await;

    let (status, first) = send(
        app.clone(),
        "POST",
        "/api/v0/devices/X/sign",
        Some(json!({ "data": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["signed_data"], "0_hello_WA==");

    let (_, second) = send(
        app.clone(),
        "POST",
        "/api/v0/devices/X/sign",
        Some(json!({ "data": "again" })),
    )
    .await;
    let previous = first["data"]["signature"].as_str().unwrap();
    assert_eq!(second["data"]["signed_data"], format!("1_again_{previous}"));

    let (_, device) = send(app, "GET", "/api/v0/devices/X", None).await;
    assert_eq!(device["data"]["signature_counter"], 2);
}

#[tokio::test]
async fn sign_rejects_empty_data() {
    let app = router(test_state());
    send(
        app.clone(),
        "POST",
        "/api/v0/devices",
        Some(json!({ "id": "d", "algorithm": "ECDSA" })),
    )
    .await;

    let (status, _) = send(app, "POST", "/api/v0/devices/d/sign", Some(json!({ "data": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_device_returns_404() {
    let app = router(test_state());

    let (status, _) = send(app.clone(), "GET", "/api/v0/devices/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        app.clone(),
        "POST",
        "/api/v0/devices/missing/sign",
        Some(json!({ "data": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(app, "DELETE", "/api/v0/devices/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_device() {
    let app = router(test_state());
    send(
        app.clone(),
        "POST",
        "/api/v0/devices",
        Some(json!({ "id": "d", "algorithm": "ECDSA" })),
    )
    .await;

    let (status, _) = send(app.clone(), "DELETE", "/api/v0/devices/d", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(app, "GET", "/api/v0/devices/d", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = router(test_state());

    let (status, _) = send(app, "GET", "/nonexistent", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
