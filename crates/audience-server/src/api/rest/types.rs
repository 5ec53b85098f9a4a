//! REST API type definitions
//!
//! Request and response types for the REST API endpoints.

use audience_core::{ConditionTree, FilterIssue, TriggerPayload};
use audience_repository::CatalogLoader;
use audience_runtime::{CustomerRecord, EventRecord};
use audience_sdk::SdkConfig;
use serde::{Deserialize, Serialize};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogLoader,
    pub sdk: SdkConfig,
}

impl AppState {
    pub fn new(catalog: CatalogLoader) -> Self {
        let sdk = SdkConfig::new().with_project(catalog.project());
        Self { catalog, sdk }
    }

    pub fn with_sdk_config(mut self, sdk: SdkConfig) -> Self {
        self.sdk = sdk;
        self
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `GET /v1/catalog` query
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// `global` or `event:<name>`; defaults to `global`
    #[serde(default)]
    pub scope: Option<String>,
}

/// Validation result for a segment tree
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub issues: Vec<FilterIssue>,
}

/// `POST /v1/segments/evaluate` body
#[derive(Debug, Deserialize)]
pub struct EvaluateSegmentRequest {
    pub groups: ConditionTree,
    #[serde(default)]
    pub customers: Vec<CustomerRecord>,
}

/// Per-customer match results, in request order
#[derive(Debug, Serialize)]
pub struct EvaluateSegmentResponse {
    pub matches: Vec<bool>,
    pub matched: usize,
}

/// `POST /v1/triggers/evaluate` body
#[derive(Debug, Deserialize)]
pub struct EvaluateTriggersRequest {
    pub triggers: Vec<TriggerPayload>,
    pub event: EventRecord,
}

/// Trigger evaluation result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateTriggersResponse {
    /// True when at least one trigger fired
    pub fired: bool,
    /// Indexes of the triggers that fired
    pub fired_triggers: Vec<usize>,
}
