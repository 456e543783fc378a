//! # Integration Tests for smslog-api
//!
//! Drives the full router with an in-memory blob store: webhook replies,
//! sender filtering, failure replies, the JSON log route, health probes,
//! and metrics.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use smslog_api::state::{AppConfig, AppState};
use smslog_core::{decode_records, MonthlyKeyResolver, PeriodKey, VersionToken};
use smslog_store::{BlobPath, InMemoryBlobStore, LogLayout, StoreError, VersionedLogStore};

const OK_REPLY: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response><Message>Message received :^)</Message></Response>"#;
const FAILED_REPLY: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response><Message>Failed to save the message :^(</Message></Response>"#;

/// Helper: build the app over a fresh in-memory store.
fn test_app(config: AppConfig) -> (InMemoryBlobStore, AppState<InMemoryBlobStore>, axum::Router) {
    let backend = InMemoryBlobStore::new();
    let log = VersionedLogStore::new(
        backend.clone(),
        MonthlyKeyResolver::default(),
        LogLayout::default(),
    );
    let state = AppState::new(log, config).unwrap();
    let app = smslog_api::app(state.clone());
    (backend, state, app)
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/sms")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Messages from every commit the store accepted, in order.
fn committed_messages(backend: &InMemoryBlobStore) -> Vec<String> {
    let attempts = backend.commit_attempts();
    let last = attempts.last().expect("at least one commit");
    decode_records(&last.content)
        .unwrap()
        .into_iter()
        .map(|r| r.message)
        .collect()
}

// -- Webhook ------------------------------------------------------------------

#[tokio::test]
async fn post_stores_trimmed_body_and_replies_ok() {
    let (backend, state, app) = test_app(AppConfig::default());

    let response = app
        .oneshot(form_post("Body=++hello+world++&From=%2B15550001111&MessageSid=SM123"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/xml"
    );
    assert_eq!(body_string(response).await, OK_REPLY);
    assert_eq!(committed_messages(&backend), vec!["hello world"]);
    assert_eq!(backend.commit_attempts()[0].precondition, None);
    assert_eq!(state.metrics.messages("stored"), 1);
}

#[tokio::test]
async fn get_with_query_is_accepted() {
    let (backend, _, app) = test_app(AppConfig::default());

    let response = app.oneshot(get("/sms?Body=from%20query")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, OK_REPLY);
    assert_eq!(committed_messages(&backend), vec!["from query"]);
}

#[tokio::test]
async fn missing_body_stores_empty_message() {
    let (backend, _, app) = test_app(AppConfig::default());

    let response = app.oneshot(get("/sms")).await.unwrap();

    assert_eq!(body_string(response).await, OK_REPLY);
    assert_eq!(committed_messages(&backend), vec![""]);
}

#[tokio::test]
async fn successive_messages_accumulate_in_order() {
    let (backend, _, app) = test_app(AppConfig::default());

    for text in ["one", "two", "three"] {
        let response = app
            .clone()
            .oneshot(form_post(&format!("Body={text}")))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, OK_REPLY);
    }

    assert_eq!(committed_messages(&backend), vec!["one", "two", "three"]);
    let attempts = backend.commit_attempts();
    assert!(attempts[1].precondition.is_some());
}

#[tokio::test]
async fn store_failure_replies_failed_with_200() {
    let (backend, state, app) = test_app(AppConfig::default());
    backend.fail_next_fetch(StoreError::Api {
        endpoint: "GET /contents/data/2024-03.json".into(),
        status: 401,
        body: "Bad credentials".into(),
    });

    let response = app.oneshot(form_post("Body=lost")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, FAILED_REPLY);
    assert!(backend.commit_attempts().is_empty());
    assert_eq!(state.metrics.messages("transport"), 1);
    assert_eq!(state.metrics.messages("stored"), 0);
}

#[tokio::test]
async fn conflict_replies_failed() {
    let (backend, state, app) = test_app(AppConfig::default());
    let period = state.log.period_for(&chrono::Utc::now());
    let path = state.log.path_for(&period);
    backend.insert(path.clone(), "[]", VersionToken::new("abc123").unwrap());
    backend.race_next_commit(path, "[]", VersionToken::new("def456").unwrap());

    let response = app.oneshot(form_post("Body=late")).await.unwrap();

    assert_eq!(body_string(response).await, FAILED_REPLY);
    assert_eq!(backend.commit_attempts().len(), 1);
    assert_eq!(state.metrics.messages("conflict"), 1);
}

#[tokio::test]
async fn unexpected_sender_is_ignored() {
    let config = AppConfig {
        allowed_sender: Some("+15550001111".into()),
        ..AppConfig::default()
    };
    let (backend, state, app) = test_app(config);

    let response = app
        .clone()
        .oneshot(form_post("Body=spam&From=%2B15559999999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.ends_with("<Response/>"), "unexpected reply: {body}");
    assert_eq!(backend.fetch_count(), 0);
    assert_eq!(state.metrics.messages("rejected"), 1);

    let response = app
        .oneshot(form_post("Body=mine&From=%2B15550001111"))
        .await
        .unwrap();
    assert_eq!(body_string(response).await, OK_REPLY);
    assert_eq!(committed_messages(&backend), vec!["mine"]);
}

#[tokio::test]
async fn custom_reply_text_is_escaped() {
    let config = AppConfig {
        replies: smslog_api::state::ReplyText {
            ok: "saved <3".into(),
            failed: "failed".into(),
        },
        ..AppConfig::default()
    };
    let (_, _, app) = test_app(config);

    let response = app.oneshot(form_post("Body=hi")).await.unwrap();

    assert!(body_string(response)
        .await
        .contains("<Message>saved &lt;3</Message>"));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let (backend, _, app) = test_app(AppConfig::default());
    let huge = format!("Body={}", "a".repeat(128 * 1024));

    let response = app.oneshot(form_post(&huge)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(backend.commit_attempts().is_empty());
}

// -- Log reads ----------------------------------------------------------------

#[tokio::test]
async fn log_route_returns_records_and_version() {
    let (backend, _, app) = test_app(AppConfig::default());
    backend.insert(
        BlobPath::for_period("data", &PeriodKey::new("2024-03").unwrap()),
        r#"[{"message":"hi","timestamp":"2024-03-01T00:00:00"}]"#,
        VersionToken::new("abc123").unwrap(),
    );

    let response = app.oneshot(get("/v1/logs/2024-03")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "period": "2024-03",
            "version": "abc123",
            "records": [{"message": "hi", "timestamp": "2024-03-01T00:00:00"}]
        })
    );
}

#[tokio::test]
async fn log_route_missing_period_is_empty() {
    let (_, _, app) = test_app(AppConfig::default());

    let response = app.oneshot(get("/v1/logs/1999-01")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["version"], serde_json::Value::Null);
    assert_eq!(json["records"], serde_json::json!([]));
}

#[tokio::test]
async fn log_route_rejects_invalid_period() {
    let (backend, _, app) = test_app(AppConfig::default());

    let response = app.oneshot(get("/v1/logs/2024.03")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(backend.fetch_count(), 0);
}

#[tokio::test]
async fn log_route_malformed_content_is_bad_gateway() {
    let (backend, _, app) = test_app(AppConfig::default());
    backend.insert(
        BlobPath::for_period("data", &PeriodKey::new("2024-03").unwrap()),
        "{not json",
        VersionToken::new("abc123").unwrap(),
    );

    let response = app.oneshot(get("/v1/logs/2024-03")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["error"]["code"], "UPSTREAM_ERROR");
}

// -- Health Probes & Metrics --------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let (_, _, app) = test_app(AppConfig::default());
    let response = app.oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let (_, _, app) = test_app(AppConfig::default());
    let response = app.oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

#[tokio::test]
async fn metrics_reflect_stored_messages() {
    let (_, _, app) = test_app(AppConfig::default());
    app.clone().oneshot(form_post("Body=hi")).await.unwrap();

    let response = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains(r#"smslog_messages_total{outcome="stored"} 1"#));
    assert!(body.contains("smslog_append_duration_seconds_count 1"));
}
