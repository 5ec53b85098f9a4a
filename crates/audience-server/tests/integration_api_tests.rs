//! Integration tests for REST API endpoints
//!
//! These tests build the router over an in-memory or file-system catalog and
//! drive it with `tower::ServiceExt::oneshot`.

use audience_core::AttributeDefinitions;
use audience_repository::{CatalogLoader, MemoryCatalogSource, RepositoryConfig};
use audience_server::{create_router, AppState, ServerConfig};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const DEFINITIONS: &str = r#"{
    "customAttributes": [
        {"name": "age", "type": "NumberScalar"},
        {"name": "tags", "type": "StringList"}
    ],
    "events": [
        {"name": "purchase", "attributes": [{"name": "amount", "type": "NumberScalar"}]},
        {"name": "signup", "attributes": [{"name": "source", "type": "StringScalar"}]}
    ]
}"#;

fn create_test_app() -> Router {
    let definitions: AttributeDefinitions = serde_json::from_str(DEFINITIONS).unwrap();
    let source = MemoryCatalogSource::new().with_project("default", definitions);
    create_router(AppState::new(CatalogLoader::new(Arc::new(source), "default")))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
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

fn group(filters: Value) -> Value {
    json!([{ "filters": filters, "nextLogic": "AND" }])
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(create_test_app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_catalog_global_scope() {
    let (status, body) = send(create_test_app(), get("/v1/catalog")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scope"], "global");
    assert_eq!(body["available"], true);

    let addresses: Vec<&str> = body["descriptors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["address"].as_str().unwrap())
        .collect();
    assert!(addresses.contains(&"email"));
    assert!(addresses.contains(&"attributes.age"));
    assert!(addresses.contains(&"events.purchase.attributes.amount"));
    assert!(addresses.contains(&"events.signup.time"));
}

#[tokio::test]
async fn test_catalog_event_scope() {
    let (status, body) = send(create_test_app(), get("/v1/catalog?scope=event:purchase")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scope"], "event:purchase");
    assert_eq!(
        body["descriptors"],
        json!([
            {"address": "events.purchase.attributes.amount", "type": "NumberScalar", "origin": {"kind": "event", "eventName": "purchase"}},
            {"address": "events.purchase.time", "type": "DateTime", "origin": {"kind": "event", "eventName": "purchase"}}
        ])
    );
}

#[tokio::test]
async fn test_catalog_invalid_scope() {
    let (status, body) = send(create_test_app(), get("/v1/catalog?scope=bogus")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_catalog_unknown_project_is_unavailable() {
    let source = MemoryCatalogSource::new();
    let app = create_router(AppState::new(CatalogLoader::new(Arc::new(source), "missing")));

    let (status, body) = send(app, get("/v1/catalog")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["descriptors"], json!([]));
}

#[tokio::test]
async fn test_catalog_from_file_system() {
    let temp_dir = TempDir::new().unwrap();
    tokio::fs::write(temp_dir.path().join("default.json"), DEFINITIONS)
        .await
        .unwrap();

    let config = RepositoryConfig::file_system(temp_dir.path().to_string_lossy());
    let app = create_router(AppState::new(CatalogLoader::from_config(&config).unwrap()));

    let (status, body) = send(app, get("/v1/catalog?scope=event:signup")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);
    assert_eq!(body["descriptors"][0]["address"], "events.signup.attributes.source");
}

#[tokio::test]
async fn test_validate_valid_segment() {
    let body = json!({
        "groups": group(json!([
            {"field": "email", "operator": "IN", "value": ["a@x.com"], "nextLogic": "AND"},
            {"field": "attributes.age", "operator": "GREATER_THAN", "value": 18, "nextLogic": "AND"}
        ]))
    });

    let (status, body) = send(create_test_app(), post_json("/v1/segments/validate", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["issues"], json!([]));
}

#[tokio::test]
async fn test_validate_reports_issue_paths() {
    let body = json!({
        "groups": [
            {"filters": [{"field": "email", "operator": "EQUALS", "value": "a@x.com", "nextLogic": "AND"}], "nextLogic": "OR"},
            {"filters": [
                {"field": "attributes.age", "operator": "GREATER_THAN", "value": 18, "nextLogic": "AND"},
                {"field": "attributes.age", "operator": "LIKE", "value": "1", "nextLogic": "AND"}
            ], "nextLogic": "AND"}
        ]
    });

    let (status, body) = send(create_test_app(), post_json("/v1/segments/validate", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    let issues = body["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["path"], json!({"group": 1, "filter": 1}));
    assert_eq!(issues[0]["kind"], "invalidOperatorForType");
}

#[tokio::test]
async fn test_validate_pristine_segment_is_incomplete() {
    let (status, body) = send(
        create_test_app(),
        post_json("/v1/segments/validate", json!({"groups": []})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["issues"][0]["kind"], "emptyField");
}

#[tokio::test]
async fn test_malformed_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/segments/validate")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(create_test_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("JSON syntax error"));
}

#[tokio::test]
async fn test_evaluate_segment() {
    let body = json!({
        "groups": group(json!([
            {"field": "email", "operator": "IN", "value": ["a@x.com", "c@x.com"], "nextLogic": "AND"},
            {"field": "attributes.age", "operator": "GREATER_THAN", "value": 18, "nextLogic": "AND"}
        ])),
        "customers": [
            {"profile": {"email": "a@x.com"}, "attributes": {"age": 30}},
            {"profile": {"email": "b@x.com"}, "attributes": {"age": 40}},
            {"profile": {"email": "c@x.com"}, "attributes": {"age": 12}}
        ]
    });

    let (status, body) = send(create_test_app(), post_json("/v1/segments/evaluate", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matches"], json!([true, false, false]));
    assert_eq!(body["matched"], 1);
}

#[tokio::test]
async fn test_evaluate_segment_over_events() {
    let body = json!({
        "groups": group(json!([
            {"field": "events.purchase.attributes.amount", "operator": "GREATER_THAN", "value": 100, "nextLogic": "AND"},
            {"field": "events.purchase.time", "operator": "LESS_THAN_EQUALS", "value": "2025-01-01T00:00:00Z", "nextLogic": "AND"}
        ])),
        "customers": [
            {"events": [{"name": "purchase", "time": "2024-06-01T10:00:00Z", "attributes": {"amount": 120}}]},
            {"events": [{"name": "purchase", "time": "2024-06-01T10:00:00Z", "attributes": {"amount": 80}}]},
            {}
        ]
    });

    let (status, body) = send(create_test_app(), post_json("/v1/segments/evaluate", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["matches"], json!([true, false, false]));
}

#[tokio::test]
async fn test_evaluate_blank_segment_rejected() {
    let body = json!({"groups": [], "customers": [{}, {"profile": {"email": "a@x.com"}}]});

    let (status, body) = send(create_test_app(), post_json("/v1/segments/evaluate", body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["issues"][0]["path"], json!({"group": 0, "filter": 0}));
    assert_eq!(body["issues"][0]["kind"], "emptyField");
}

#[tokio::test]
async fn test_evaluate_invalid_segment_rejected() {
    let body = json!({
        "groups": group(json!([
            {"field": "email", "operator": "IN", "value": "a@x.com", "nextLogic": "AND"}
        ])),
        "customers": [{}]
    });

    let (status, body) = send(create_test_app(), post_json("/v1/segments/evaluate", body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);
    assert_eq!(body["issues"][0]["kind"], "valueShapeMismatch");
}

#[tokio::test]
async fn test_evaluate_triggers() {
    let triggers = json!([
        {"eventName": "purchase", "filterGroups": group(json!([
            {"field": "events.purchase.attributes.amount", "operator": "GREATER_THAN", "value": 100, "nextLogic": "AND"}
        ]))},
        {"eventName": "signup", "filterGroups": group(json!([
            {"field": "events.signup.time", "operator": "EXISTS", "nextLogic": "AND"}
        ]))},
        {"eventName": "purchase", "filterGroups": group(json!([
            {"field": "events.purchase.time", "operator": "EXISTS", "nextLogic": "AND"}
        ]))}
    ]);

    let big = json!({
        "triggers": triggers,
        "event": {"name": "purchase", "time": "2024-06-01T10:00:00Z", "attributes": {"amount": 120}}
    });
    let (status, body) = send(create_test_app(), post_json("/v1/triggers/evaluate", big)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fired"], true);
    assert_eq!(body["firedTriggers"], json!([0, 2]));

    let small = json!({
        "triggers": triggers,
        "event": {"name": "purchase", "time": "2024-06-01T10:00:00Z", "attributes": {"amount": 50}}
    });
    let (_, body) = send(create_test_app(), post_json("/v1/triggers/evaluate", small)).await;
    assert_eq!(body["firedTriggers"], json!([2]));
}

#[tokio::test]
async fn test_evaluate_triggers_none_fire() {
    let body = json!({
        "triggers": [{"eventName": "signup", "filterGroups": group(json!([
            {"field": "events.signup.time", "operator": "EXISTS", "nextLogic": "AND"}
        ]))}],
        "event": {"name": "purchase", "time": "2024-06-01T10:00:00Z"}
    });

    let (status, body) = send(create_test_app(), post_json("/v1/triggers/evaluate", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fired"], false);
    assert_eq!(body["firedTriggers"], json!([]));
}

#[tokio::test]
async fn test_evaluate_invalid_trigger_rejected() {
    let body = json!({
        "triggers": [{"eventName": "purchase", "filterGroups": group(json!([
            {"field": "events.purchase.attributes.amount", "operator": "GREATER_THAN", "nextLogic": "AND"}
        ]))}],
        "event": {"name": "purchase", "time": "2024-06-01T10:00:00Z", "attributes": {"amount": 50}}
    });

    let (status, body) = send(create_test_app(), post_json("/v1/triggers/evaluate", body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["issues"][0]["kind"], "missingValue");
}

#[tokio::test]
async fn test_evaluate_blank_trigger_rejected() {
    let body = json!({
        "triggers": [{"eventName": "purchase", "filterGroups": []}],
        "event": {"name": "purchase", "time": "2024-06-01T10:00:00Z"}
    });

    let (status, body) = send(create_test_app(), post_json("/v1/triggers/evaluate", body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["issues"][0]["kind"], "emptyField");
}

#[tokio::test]
async fn test_default_config_rejects_unknown_fields() {
    let loader = ServerConfig::default().catalog_loader().unwrap();
    let app = create_router(AppState::new(loader));

    let body = json!({
        "groups": group(json!([
            {"field": "attributes.nonexistent", "operator": "EXISTS", "nextLogic": "AND"},
            {"field": "attributes.plan", "operator": "EQUALS", "value": "pro", "nextLogic": "AND"}
        ]))
    });
    let (status, body) = send(app, post_json("/v1/segments/validate", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    let issues = body["issues"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["kind"], "unknownField");
    assert_eq!(issues[0]["field"], "attributes.nonexistent");
}
