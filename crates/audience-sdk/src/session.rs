//! Editing sessions
//!
//! A session owns one builder and mediates catalog loads, the only
//! asynchronous boundary of editing. Each load is tagged with a generation;
//! while a load is pending the editor is disabled (not torn down), and a
//! response whose generation is no longer current is dropped instead of being
//! applied to a builder whose scope has moved on.

use crate::builder::ConditionBuilder;
use crate::config::SdkConfig;
use crate::error::{Result, SdkError};
use crate::trigger::TriggerBuilder;
use audience_core::{CatalogScope, CatalogSnapshot, SegmentPayload, TriggerPayload};
use audience_repository::{CatalogLoader, ConditionStore};
use std::sync::Arc;

/// Ticket for one in-flight catalog load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRequest {
    generation: u64,
    scope: CatalogScope,
}

impl CatalogRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn scope(&self) -> &CatalogScope {
        &self.scope
    }
}

/// Generation bookkeeping shared by both session kinds
#[derive(Debug, Default)]
struct CatalogTracker {
    generation: u64,
    pending: Option<CatalogRequest>,
}

impl CatalogTracker {
    fn request(&mut self, scope: CatalogScope) -> CatalogRequest {
        self.generation += 1;
        let request = CatalogRequest {
            generation: self.generation,
            scope,
        };
        if let Some(ref superseded) = self.pending {
            tracing::debug!(
                "Catalog request {} superseded by {}",
                superseded.generation,
                request.generation
            );
        }
        self.pending = Some(request.clone());
        request
    }

    /// Returns true when `request` is the pending one, clearing it
    fn settle(&mut self, request: &CatalogRequest) -> bool {
        match self.pending {
            Some(ref pending) if pending == request => {
                self.pending = None;
                true
            }
            _ => {
                tracing::warn!(
                    "Dropping stale catalog response (generation {}, scope {})",
                    request.generation,
                    request.scope
                );
                false
            }
        }
    }

    fn cancel(&mut self) {
        self.pending = None;
    }

    fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Editing session for a segment
#[derive(Debug)]
pub struct SegmentSession {
    builder: ConditionBuilder,
    catalog: CatalogTracker,
}

impl SegmentSession {
    /// Start a session on a new segment; the catalog is not loaded yet
    pub fn new(config: &SdkConfig) -> Self {
        let catalog = Arc::new(CatalogSnapshot::unavailable(CatalogScope::Global));
        Self {
            builder: ConditionBuilder::new(catalog).with_config(config),
            catalog: CatalogTracker::default(),
        }
    }

    /// Start a session and load the global catalog
    pub async fn open(config: &SdkConfig, loader: &CatalogLoader) -> Self {
        let mut session = Self::new(config);
        session.reload_catalog(loader).await;
        session
    }

    /// Begin a catalog load; editing is disabled until it is applied
    pub fn request_catalog(&mut self) -> CatalogRequest {
        self.catalog.request(CatalogScope::Global)
    }

    /// Apply a loaded catalog; returns false (and changes nothing) when the
    /// request is stale
    pub fn apply_catalog(&mut self, request: &CatalogRequest, snapshot: CatalogSnapshot) -> bool {
        if !self.catalog.settle(request) {
            return false;
        }
        tracing::info!(
            "Segment catalog ready: {} attributes (available: {})",
            snapshot.len(),
            snapshot.is_available()
        );
        self.builder.set_catalog(Arc::new(snapshot));
        true
    }

    /// Request, load and apply the global catalog
    pub async fn reload_catalog(&mut self, loader: &CatalogLoader) -> bool {
        let request = self.request_catalog();
        let snapshot = loader.load(request.scope()).await;
        self.apply_catalog(&request, snapshot)
    }

    /// Discard any in-flight catalog load
    pub fn cancel(&mut self) {
        self.catalog.cancel();
    }

    /// Whether editing is enabled (no catalog load pending)
    pub fn is_editable(&self) -> bool {
        !self.catalog.is_pending()
    }

    pub fn builder(&self) -> &ConditionBuilder {
        &self.builder
    }

    /// Builder for editing; unavailable while a catalog load is pending
    pub fn builder_mut(&mut self) -> Result<&mut ConditionBuilder> {
        if self.catalog.is_pending() {
            return Err(SdkError::CatalogPending);
        }
        Ok(&mut self.builder)
    }

    /// Replace the tree with a persisted payload
    pub fn load_payload(&mut self, payload: SegmentPayload) {
        self.builder.load(payload.groups);
    }

    /// Load a persisted segment from the store
    pub async fn load(&mut self, store: &dyn ConditionStore, segment_id: &str) -> Result<()> {
        let payload = store.load_segment(segment_id).await?;
        self.load_payload(payload);
        tracing::info!("Loaded segment '{}'", segment_id);
        Ok(())
    }

    /// Validate and produce the persisted payload
    pub fn submit(&self) -> Result<SegmentPayload> {
        Ok(SegmentPayload::from(self.builder.submit()?))
    }

    /// Submit and save to the store
    pub async fn save(
        &self,
        store: &dyn ConditionStore,
        segment_id: &str,
    ) -> Result<SegmentPayload> {
        let payload = self.submit()?;
        store.save_segment(segment_id, &payload).await?;
        tracing::info!("Saved segment '{}'", segment_id);
        Ok(payload)
    }
}

/// Editing session for one campaign trigger
#[derive(Debug)]
pub struct TriggerSession {
    trigger: TriggerBuilder,
    catalog: CatalogTracker,
}

impl TriggerSession {
    /// Start a session with no event chosen
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            trigger: TriggerBuilder::new(config),
            catalog: CatalogTracker::default(),
        }
    }

    /// Resume a persisted trigger; its event catalog still has to be loaded
    pub fn from_payload(config: &SdkConfig, payload: TriggerPayload) -> Self {
        let scope = CatalogScope::event(payload.event_name.clone());
        let catalog = Arc::new(CatalogSnapshot::unavailable(scope));
        Self {
            trigger: TriggerBuilder::from_payload(config, payload, catalog),
            catalog: CatalogTracker::default(),
        }
    }

    /// Choose the governing event and begin loading its catalog.
    ///
    /// A different event resets the conditions; any earlier in-flight load
    /// becomes stale.
    pub fn select_event(&mut self, event_name: impl Into<String>) -> CatalogRequest {
        let event_name = event_name.into();
        let scope = CatalogScope::event(event_name.clone());
        self.trigger.select_event(
            event_name,
            Arc::new(CatalogSnapshot::unavailable(scope.clone())),
        );
        self.catalog.request(scope)
    }

    /// Reload the catalog of the current event
    pub fn request_catalog(&mut self) -> Result<CatalogRequest> {
        let event_name = self
            .trigger
            .event_name()
            .ok_or(SdkError::EventNotSelected)?;
        let scope = CatalogScope::event(event_name);
        Ok(self.catalog.request(scope))
    }

    /// Apply a loaded catalog; returns false (and changes nothing) when the
    /// request is stale
    pub fn apply_catalog(&mut self, request: &CatalogRequest, snapshot: CatalogSnapshot) -> bool {
        if !self.catalog.settle(request) {
            return false;
        }
        tracing::info!(
            "Trigger catalog ready for {}: {} attributes",
            request.scope(),
            snapshot.len()
        );
        self.trigger.set_catalog(Arc::new(snapshot));
        true
    }

    /// Choose an event and load its catalog
    pub async fn choose_event(
        &mut self,
        event_name: impl Into<String>,
        loader: &CatalogLoader,
    ) -> bool {
        let request = self.select_event(event_name);
        let snapshot = loader.load(request.scope()).await;
        self.apply_catalog(&request, snapshot)
    }

    /// Discard any in-flight catalog load
    pub fn cancel(&mut self) {
        self.catalog.cancel();
    }

    /// Editing needs a chosen event and no pending catalog load
    pub fn is_editable(&self) -> bool {
        self.trigger.is_editable() && !self.catalog.is_pending()
    }

    pub fn trigger(&self) -> &TriggerBuilder {
        &self.trigger
    }

    /// Condition builder for editing
    pub fn builder_mut(&mut self) -> Result<&mut ConditionBuilder> {
        if self.catalog.is_pending() {
            return Err(SdkError::CatalogPending);
        }
        self.trigger.builder_mut()
    }

    /// Validate and produce the persisted payload
    pub fn submit(&self) -> Result<TriggerPayload> {
        self.trigger.submit()
    }
}

/// Submit every trigger of a campaign; the first failure blocks the whole list
pub fn submit_triggers(sessions: &[TriggerSession]) -> Result<Vec<TriggerPayload>> {
    sessions.iter().map(TriggerSession::submit).collect()
}

/// Submit every trigger of a campaign and save the list
pub async fn save_triggers(
    sessions: &[TriggerSession],
    store: &dyn ConditionStore,
    campaign_id: &str,
) -> Result<Vec<TriggerPayload>> {
    let triggers = submit_triggers(sessions)?;
    store.save_triggers(campaign_id, &triggers).await?;
    tracing::info!("Saved {} trigger(s) for campaign '{}'", triggers.len(), campaign_id);
    Ok(triggers)
}

/// Load a campaign's triggers into sessions; their catalogs still have to be loaded
pub async fn load_triggers(
    config: &SdkConfig,
    store: &dyn ConditionStore,
    campaign_id: &str,
) -> Result<Vec<TriggerSession>> {
    let triggers = store.load_triggers(campaign_id).await?;
    Ok(triggers
        .into_iter()
        .map(|payload| TriggerSession::from_payload(config, payload))
        .collect())
}
