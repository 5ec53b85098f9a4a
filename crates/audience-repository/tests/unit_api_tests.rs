//! Unit tests for the HTTP API catalog source and condition store
//!
//! These tests use mockito to mock HTTP API responses.

#![cfg(feature = "api")]

use audience_core::{CatalogScope, SegmentPayload, TriggerPayload};
use audience_repository::{
    ApiCatalogSource, ApiConditionStore, CatalogLoader, CatalogSource, ConditionStore,
    RepositoryConfig, RepositoryError,
};
use mockito::Server;

const DEFINITIONS: &str = r#"{
    "customAttributes": [{"name": "plan", "type": "StringScalar"}],
    "events": [{"name": "purchase", "attributes": [{"name": "amount", "type": "NumberScalar"}]}]
}"#;

#[tokio::test]
async fn test_fetch_definitions() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/projects/shop/definitions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(DEFINITIONS)
        .create_async()
        .await;

    let source = ApiCatalogSource::new(server.url(), None::<String>).unwrap();
    let definitions = source.fetch_definitions("shop").await.unwrap();

    assert_eq!(definitions.custom_attributes.len(), 1);
    assert_eq!(definitions.event_names(), vec!["purchase"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_api_key_sent_as_bearer() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/projects/shop/definitions")
        .match_header("Authorization", "Bearer test_key_123")
        .with_status(200)
        .with_body(DEFINITIONS)
        .create_async()
        .await;

    let source = ApiCatalogSource::new(server.url(), Some("test_key_123")).unwrap();
    assert!(source.fetch_definitions("shop").await.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_not_found_and_server_errors() {
    let mut server = Server::new_async().await;
    let _missing = server
        .mock("GET", "/projects/gone/definitions")
        .with_status(404)
        .create_async()
        .await;
    let _broken = server
        .mock("GET", "/projects/broken/definitions")
        .with_status(500)
        .create_async()
        .await;

    let source = ApiCatalogSource::new(server.url(), None::<String>).unwrap();
    assert!(matches!(
        source.fetch_definitions("gone").await,
        Err(RepositoryError::NotFound { .. })
    ));
    assert!(matches!(
        source.fetch_definitions("broken").await,
        Err(RepositoryError::ApiError(_))
    ));
}

#[tokio::test]
async fn test_loader_degrades_on_api_failure() {
    let mut server = Server::new_async().await;
    let _m = server
        .mock("GET", "/projects/shop/definitions")
        .with_status(503)
        .create_async()
        .await;

    let config = RepositoryConfig::api(server.url()).with_project("shop");
    let loader = CatalogLoader::from_config(&config).unwrap();

    let snapshot = loader.load(&CatalogScope::Global).await;
    assert!(!snapshot.is_available());
}

#[tokio::test]
async fn test_segment_store() {
    let mut server = Server::new_async().await;
    let body = r#"{"groups":[{"filters":[{"field":"email","operator":"EXISTS","nextLogic":"AND"}],"nextLogic":"AND"}]}"#;

    let get = server
        .mock("GET", "/segments/vip")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/segments/vip")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::JsonString(body.to_string()))
        .with_status(204)
        .create_async()
        .await;

    let store = ApiConditionStore::new(server.url(), None::<String>).unwrap();
    let payload: SegmentPayload = store.load_segment("vip").await.unwrap();
    assert_eq!(payload.groups.len(), 1);

    store.save_segment("vip", &payload).await.unwrap();
    get.assert_async().await;
    put.assert_async().await;
}

#[tokio::test]
async fn test_trigger_store() {
    let mut server = Server::new_async().await;
    let put = server
        .mock("PUT", "/campaigns/welcome/triggers")
        .match_body(mockito::Matcher::Regex(
            r#""eventName":"purchase""#.to_string(),
        ))
        .with_status(200)
        .create_async()
        .await;
    let _get = server
        .mock("GET", "/campaigns/welcome/triggers")
        .with_status(200)
        .with_body(r#"[{"eventName":"purchase","filterGroups":[]}]"#)
        .create_async()
        .await;

    let store = ApiConditionStore::new(server.url(), None::<String>).unwrap();
    store
        .save_triggers("welcome", &[TriggerPayload::new("purchase")])
        .await
        .unwrap();
    put.assert_async().await;

    let triggers = store.load_triggers("welcome").await.unwrap();
    assert_eq!(triggers.len(), 1);
    // an empty persisted tree is repaired to the rest state
    assert!(triggers[0].condition_tree.is_pristine());
}
