//! Unit tests for the file system catalog source and condition store

use audience_core::{
    CatalogScope, ComparisonOperator, ConditionTree, FilterPath, FilterValue, SegmentPayload,
    TriggerPayload,
};
use audience_repository::{
    open_condition_store, CatalogLoader, CatalogSource, ConditionStore, FileSystemCatalogSource,
    FileSystemConditionStore, RepositoryConfig, RepositoryError,
};
use tempfile::TempDir;
use tokio::fs;

const DEFINITIONS: &str = r#"{
    "customAttributes": [
        {"name": "plan", "type": "StringScalar"},
        {"name": "lifetimeValue", "type": "NumberScalar"}
    ],
    "events": [
        {"name": "purchase", "attributes": [{"name": "amount", "type": "NumberScalar"}]},
        {"name": "signup"}
    ]
}"#;

/// Helper function to create a catalog directory with one project
async fn create_catalog_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("shop.json"), DEFINITIONS)
        .await
        .unwrap();
    temp_dir
}

fn sample_tree() -> ConditionTree {
    ConditionTree::new()
        .update_filter(FilterPath::new(0, 0), |f| {
            f.field = "email".to_string();
            f.operator = ComparisonOperator::In;
            f.value = Some(FilterValue::texts(["a@x.com", "b@x.com"]));
        })
        .unwrap()
}

// =============================================================================
// Catalog source
// =============================================================================

#[tokio::test]
async fn test_fetch_definitions() {
    let dir = create_catalog_dir().await;
    let source = FileSystemCatalogSource::new(dir.path()).unwrap();

    let definitions = source.fetch_definitions("shop").await.unwrap();
    assert_eq!(definitions.custom_attributes.len(), 2);
    assert_eq!(definitions.event_names(), vec!["purchase", "signup"]);
}

#[tokio::test]
async fn test_fetch_missing_project() {
    let dir = create_catalog_dir().await;
    let source = FileSystemCatalogSource::new(dir.path()).unwrap();

    assert!(matches!(
        source.fetch_definitions("other").await,
        Err(RepositoryError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_fetch_malformed_definitions() {
    let dir = create_catalog_dir().await;
    fs::write(dir.path().join("broken.json"), "{ not json")
        .await
        .unwrap();
    let source = FileSystemCatalogSource::new(dir.path()).unwrap();

    assert!(matches!(
        source.fetch_definitions("broken").await,
        Err(RepositoryError::JsonParse(_))
    ));
}

#[tokio::test]
async fn test_loader_from_config() {
    let dir = create_catalog_dir().await;
    let config =
        RepositoryConfig::file_system(dir.path().to_string_lossy().to_string()).with_project("shop");
    let loader = CatalogLoader::from_config(&config).unwrap();

    let snapshot = loader.load(&CatalogScope::event("purchase")).await;
    assert!(snapshot.is_available());
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.contains("events.purchase.attributes.amount"));
    assert!(snapshot.contains("events.purchase.time"));

    // unknown project degrades to an unavailable snapshot
    let other = CatalogLoader::from_config(&config.clone().with_project("other")).unwrap();
    assert!(!other.load(&CatalogScope::Global).await.is_available());
}

// =============================================================================
// Condition store
// =============================================================================

#[tokio::test]
async fn test_segment_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = FileSystemConditionStore::new(dir.path()).unwrap();

    assert!(matches!(
        store.load_segment("vip").await,
        Err(RepositoryError::NotFound { .. })
    ));

    let payload = SegmentPayload::from(sample_tree());
    store.save_segment("vip", &payload).await.unwrap();
    assert!(dir.path().join("segments/vip.json").exists());
    assert_eq!(store.load_segment("vip").await.unwrap(), payload);
}

#[tokio::test]
async fn test_triggers_round_trip() {
    let dir = TempDir::new().unwrap();
    let config = RepositoryConfig::file_system(dir.path().to_string_lossy().to_string());
    let store = open_condition_store(&config).unwrap();

    let mut purchase = TriggerPayload::new("purchase");
    purchase.condition_tree = sample_tree();
    let triggers = vec![purchase, TriggerPayload::new("signup")];

    store.save_triggers("welcome", &triggers).await.unwrap();
    assert_eq!(store.load_triggers("welcome").await.unwrap(), triggers);

    let raw = fs::read_to_string(dir.path().join("triggers/welcome.json"))
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["eventName"], "purchase");
    assert_eq!(json[0]["filterGroups"][0]["filters"][0]["operator"], "IN");
}

#[tokio::test]
async fn test_rejects_path_escapes() {
    let dir = TempDir::new().unwrap();
    let store = FileSystemConditionStore::new(dir.path()).unwrap();

    assert!(matches!(
        store.load_segment("../secrets").await,
        Err(RepositoryError::InvalidPath { .. })
    ));
}
