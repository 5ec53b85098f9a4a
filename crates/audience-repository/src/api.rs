//! HTTP API catalog source and condition store
//!
//! # Endpoints
//!
//! ```text
//! GET  {base}/projects/{project}/definitions   -> AttributeDefinitions
//! GET  {base}/segments/{id}                    -> { "groups": [...] }
//! PUT  {base}/segments/{id}                    <- { "groups": [...] }
//! GET  {base}/campaigns/{id}/triggers          -> [{ "eventName", "filterGroups" }]
//! PUT  {base}/campaigns/{id}/triggers          <- [{ "eventName", "filterGroups" }]
//! ```
//!
//! # Authentication
//!
//! If an API key is provided, it's sent as a Bearer token:
//!
//! ```text
//! Authorization: Bearer {api_key}
//! ```

use async_trait::async_trait;
use audience_core::{AttributeDefinitions, SegmentPayload, TriggerPayload};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{RepositoryError, RepositoryResult};
use crate::traits::{CatalogSource, ConditionStore};

/// Shared HTTP plumbing for the API backends
#[derive(Debug, Clone)]
struct ApiClient {
    /// HTTP client for making requests
    client: Client,

    /// Base URL of the API (e.g., "https://api.example.com/audience")
    base_url: String,

    /// Optional API key for authentication
    api_key: Option<String>,
}

impl ApiClient {
    fn new(base_url: impl Into<String>, api_key: Option<String>) -> RepositoryResult<Self> {
        // Create HTTP client with timeout
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                RepositoryError::ApiError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.api_key {
            Some(ref key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, id: &str) -> RepositoryResult<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| RepositoryError::ApiError(format!("Request for '{}' failed: {}", id, e)))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(RepositoryError::NotFound { id: id.to_string() }),
            status => Err(RepositoryError::ApiError(format!(
                "API returned status {} for '{}'",
                status, id
            ))),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, id: &str) -> RepositoryResult<T> {
        let url = self.url(path);
        tracing::debug!("GET {}", url);
        let response = self.send(self.client.get(&url), id).await?;
        let body = response
            .text()
            .await
            .map_err(|e| RepositoryError::ApiError(format!("Failed to read response: {}", e)))?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn put_json<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        id: &str,
        body: &T,
    ) -> RepositoryResult<()> {
        let url = self.url(path);
        tracing::debug!("PUT {}", url);
        let body = serde_json::to_string(body)?;
        let request = self
            .client
            .put(&url)
            .header("Content-Type", "application/json")
            .body(body);
        self.send(request, id).await?;
        Ok(())
    }
}

/// Catalog source backed by a remote HTTP API
#[derive(Debug, Clone)]
pub struct ApiCatalogSource {
    api: ApiClient,
}

impl ApiCatalogSource {
    /// Create a new API catalog source
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the API server
    /// * `api_key` - Optional API key for Bearer token authentication
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<impl Into<String>>,
    ) -> RepositoryResult<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, api_key.map(|k| k.into()))?,
        })
    }
}

#[async_trait]
impl CatalogSource for ApiCatalogSource {
    async fn fetch_definitions(&self, project: &str) -> RepositoryResult<AttributeDefinitions> {
        self.api
            .get_json(&format!("projects/{}/definitions", project), project)
            .await
    }
}

/// Condition store backed by a remote HTTP API
#[derive(Debug, Clone)]
pub struct ApiConditionStore {
    api: ApiClient,
}

impl ApiConditionStore {
    /// Create a new API condition store
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<impl Into<String>>,
    ) -> RepositoryResult<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, api_key.map(|k| k.into()))?,
        })
    }
}

#[async_trait]
impl ConditionStore for ApiConditionStore {
    async fn load_segment(&self, segment_id: &str) -> RepositoryResult<SegmentPayload> {
        self.api
            .get_json(&format!("segments/{}", segment_id), segment_id)
            .await
    }

    async fn save_segment(
        &self,
        segment_id: &str,
        payload: &SegmentPayload,
    ) -> RepositoryResult<()> {
        self.api
            .put_json(&format!("segments/{}", segment_id), segment_id, payload)
            .await
    }

    async fn load_triggers(&self, campaign_id: &str) -> RepositoryResult<Vec<TriggerPayload>> {
        self.api
            .get_json(&format!("campaigns/{}/triggers", campaign_id), campaign_id)
            .await
    }

    async fn save_triggers(
        &self,
        campaign_id: &str,
        triggers: &[TriggerPayload],
    ) -> RepositoryResult<()> {
        self.api
            .put_json(&format!("campaigns/{}/triggers", campaign_id), campaign_id, triggers)
            .await
    }
}
