//! In-memory catalog source and condition store

use async_trait::async_trait;
use audience_core::{AttributeDefinitions, SegmentPayload, TriggerPayload};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{RepositoryError, RepositoryResult};
use crate::traits::{CatalogSource, ConditionStore};

/// Catalog source holding definitions per project in memory
#[derive(Default)]
pub struct MemoryCatalogSource {
    definitions: RwLock<HashMap<String, AttributeDefinitions>>,
}

impl MemoryCatalogSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a project's definitions
    pub fn with_project(
        mut self,
        project: impl Into<String>,
        definitions: AttributeDefinitions,
    ) -> Self {
        self.definitions
            .get_mut()
            .insert(project.into(), definitions);
        self
    }

    /// Replace a project's definitions
    pub async fn set_definitions(
        &self,
        project: impl Into<String>,
        definitions: AttributeDefinitions,
    ) {
        self.definitions
            .write()
            .await
            .insert(project.into(), definitions);
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalogSource {
    async fn fetch_definitions(&self, project: &str) -> RepositoryResult<AttributeDefinitions> {
        self.definitions
            .read()
            .await
            .get(project)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                id: project.to_string(),
            })
    }
}

/// Condition store keeping payloads in memory
#[derive(Default)]
pub struct MemoryConditionStore {
    segments: RwLock<HashMap<String, SegmentPayload>>,
    triggers: RwLock<HashMap<String, Vec<TriggerPayload>>>,
}

impl MemoryConditionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConditionStore for MemoryConditionStore {
    async fn load_segment(&self, segment_id: &str) -> RepositoryResult<SegmentPayload> {
        self.segments
            .read()
            .await
            .get(segment_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                id: segment_id.to_string(),
            })
    }

    async fn save_segment(
        &self,
        segment_id: &str,
        payload: &SegmentPayload,
    ) -> RepositoryResult<()> {
        self.segments
            .write()
            .await
            .insert(segment_id.to_string(), payload.clone());
        Ok(())
    }

    async fn load_triggers(&self, campaign_id: &str) -> RepositoryResult<Vec<TriggerPayload>> {
        self.triggers
            .read()
            .await
            .get(campaign_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                id: campaign_id.to_string(),
            })
    }

    async fn save_triggers(
        &self,
        campaign_id: &str,
        triggers: &[TriggerPayload],
    ) -> RepositoryResult<()> {
        self.triggers
            .write()
            .await
            .insert(campaign_id.to_string(), triggers.to_vec());
        Ok(())
    }
}
