// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request methods against live local servers.
//!
//! These tests verify that:
//! 1. Enveloped payloads are unwrapped and raw bodies pass through
//! 2. Envelope metadata reaches the meta hook
//! 3. Failures of every kind are normalized into one error shape

use axum::{
    extract::Query,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use course_watcher::client::{ApiClient, ErrorCode, RequestOptions};
use course_watcher::models::PaginationMeta;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod common;

fn test_router() -> Router {
    Router::new()
        .route(
            "/wrapped",
            get(|| async {
                Json(json!({
                    "success": true,
                    "message": "ok",
                    "data": {"answer": 42},
                    "meta": {"total": 30, "page": 2, "limit": 10, "totalPages": 3}
                }))
            }),
        )
        .route(
            "/unshaped",
            get(|| async { Json(json!({"success": true, "message": "no data key"})) }),
        )
        .route(
            "/missing",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "success": false,
                        "message": "Course not found",
                        "data": null,
                        "code": "COURSE_NOT_FOUND"
                    })),
                )
            }),
        )
        .route(
            "/plain-message",
            get(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"message": "Title is required"})),
                )
            }),
        )
        .route(
            "/broken",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream exploded") }),
        )
        .route(
            "/teapot",
            get(|| async { StatusCode::IM_A_TEAPOT.into_response() }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                Json(json!({"late": true}))
            }),
        )
        .route(
            "/echo-query",
            get(|Query(pairs): Query<Vec<(String, String)>>| async move { Json(pairs) }),
        )
        .route(
            "/echo-headers",
            get(|headers: HeaderMap| async move {
                let get = |name: header::HeaderName| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string()
                };
                Json(json!({
                    "contentType": get(header::CONTENT_TYPE),
                    "accept": get(header::ACCEPT),
                    "custom": get(header::HeaderName::from_static("x-custom")),
                }))
            }),
        )
        .route(
            "/echo-body",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"success": true, "message": "created", "data": body}))
            }),
        )
}

async fn client() -> ApiClient {
    ApiClient::new(common::spawn_router(test_router()).await)
}

#[tokio::test]
async fn test_envelope_is_unwrapped() {
    let client = client().await;
    let payload: Value = client.get("wrapped", RequestOptions::new()).await.unwrap();
    assert_eq!(payload, json!({"answer": 42}));
}

#[tokio::test]
async fn test_meta_hook_receives_pagination() {
    let client = client().await;
    let seen: Arc<Mutex<Option<PaginationMeta>>> = Arc::new(Mutex::new(None));
    let sink = seen.clone();

    let _: Value = client
        .get(
            "wrapped",
            RequestOptions::new().on_meta(move |meta| {
                *sink.lock().unwrap() = PaginationMeta::from_meta(meta);
            }),
        )
        .await
        .unwrap();

    let meta = seen.lock().unwrap().expect("meta hook not called");
    assert_eq!(meta.total, 30);
    assert_eq!(meta.page, 2);
    assert_eq!(meta.total_pages, 3);
}

#[tokio::test]
async fn test_non_envelope_bodies_pass_through() {
    let client = client().await;

    let partial: Value = client.get("unshaped", RequestOptions::new()).await.unwrap();
    assert_eq!(partial, json!({"success": true, "message": "no data key"}));

    let server = common::TestServer::start().await;
    let health: Value = ApiClient::new(&server.base_url)
        .get("health", RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
}

#[tokio::test]
async fn test_enveloped_error_keeps_server_message_and_code() {
    let client = client().await;
    let err = client
        .get::<Value>("missing", RequestOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.message, "Course not found");
    assert_eq!(err.code, ErrorCode::Named("COURSE_NOT_FOUND".to_string()));
    assert_eq!(err.status, Some(404));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_bare_message_is_used() {
    let client = client().await;
    let err = client
        .get::<Value>("plain-message", RequestOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.message, "Title is required");
    assert_eq!(err.code, ErrorCode::Numeric(422));
}

#[tokio::test]
async fn test_status_table_fallbacks() {
    let client = client().await;

    let err = client
        .get::<Value>("broken", RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(
        err.message,
        "Service temporarily unavailable. Please try again later."
    );
    assert_eq!(err.code, ErrorCode::Numeric(502));

    let err = client
        .get::<Value>("teapot", RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.message, "Error 418: I'm a teapot");

    let err = client
        .get::<Value>("no-such-route", RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.message, "Resource not found.");
}

#[tokio::test]
async fn test_connection_refused_is_client_error() {
    let client = ApiClient::new(common::UNREACHABLE_URL);
    let err = client
        .get::<Value>("anything", RequestOptions::new())
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::Client);
    assert_eq!(err.code.to_string(), "CLIENT_ERROR");
    assert_eq!(err.status, None);
    assert!(err.message.starts_with("Connection error: "));
}

#[tokio::test]
async fn test_timeout_reported_as_408() {
    let client = client().await;
    let err = client
        .get::<Value>(
            "slow",
            RequestOptions::new().timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status, Some(408));
    assert_eq!(err.code, ErrorCode::Numeric(408));
    assert_eq!(err.message, "Request timed out. Please try again.");
}

#[tokio::test]
async fn test_default_timeout_applies() {
    let client = client()
        .await
        .with_default_timeout(Duration::from_millis(50));
    let err = client
        .get::<Value>("slow", RequestOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(408));
}

#[tokio::test]
async fn test_query_params_are_sent() {
    let client = client().await;
    let pairs: Vec<(String, String)> = client
        .get(
            "echo-query",
            RequestOptions::new()
                .param("page", 2)
                .params_from(&json!({"search": "rust", "level": null, "tags": ["a", "b"]})),
        )
        .await
        .unwrap();

    assert!(pairs.contains(&("page".to_string(), "2".to_string())));
    assert!(pairs.contains(&("search".to_string(), "rust".to_string())));
    assert!(pairs.contains(&("tags".to_string(), "a".to_string())));
    assert!(pairs.contains(&("tags".to_string(), "b".to_string())));
    assert!(!pairs.iter().any(|(k, _)| k == "level"));
}

#[tokio::test]
async fn test_default_headers_unless_overridden() {
    let client = client().await;

    let defaults: Value = client.get("echo-headers", RequestOptions::new()).await.unwrap();
    assert_eq!(defaults["contentType"], "application/json");
    assert_eq!(defaults["accept"], "application/json");

    let mut custom = reqwest::header::HeaderMap::new();
    custom.insert("x-custom", "yes".parse().unwrap());
    let replaced: Value = client
        .get("echo-headers", RequestOptions::new().headers(custom))
        .await
        .unwrap();
    assert_eq!(replaced["custom"], "yes");
    assert_eq!(replaced["contentType"], "");
}

#[tokio::test]
async fn test_post_body_round_trip() {
    let client = client().await;
    let body = json!({"title": "Rust", "tags": ["systems"]});
    let echoed: Value = client
        .post("echo-body", &body, RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(echoed, body);
}
