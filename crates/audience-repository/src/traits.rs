//! Core trait definitions for the external collaborators
//!
//! - [`CatalogSource`]: supplies attribute and event definitions per project
//! - [`ConditionStore`]: persists segment and trigger condition trees
//!
//! # Example
//!
//! ```no_run
//! use audience_repository::{CatalogSource, FileSystemCatalogSource};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let source = FileSystemCatalogSource::new("catalog")?;
//! let definitions = source.fetch_definitions("shop").await?;
//! println!("{} events", definitions.events.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use audience_core::{AttributeDefinitions, SegmentPayload, TriggerPayload};

use crate::RepositoryResult;

/// Source of attribute/event definitions
///
/// Implementations only fetch; turning definitions into a scoped catalog
/// snapshot and absorbing failures is the job of
/// [`CatalogLoader`](crate::CatalogLoader).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the definitions for a project
    async fn fetch_definitions(&self, project: &str) -> RepositoryResult<AttributeDefinitions>;
}

/// Persistence for submitted condition trees
#[async_trait]
pub trait ConditionStore: Send + Sync {
    /// Load a segment's conditions
    async fn load_segment(&self, segment_id: &str) -> RepositoryResult<SegmentPayload>;

    /// Save (create or replace) a segment's conditions
    async fn save_segment(&self, segment_id: &str, payload: &SegmentPayload)
        -> RepositoryResult<()>;

    /// Load a campaign's trigger list
    async fn load_triggers(&self, campaign_id: &str) -> RepositoryResult<Vec<TriggerPayload>>;

    /// Save (create or replace) a campaign's trigger list
    async fn save_triggers(
        &self,
        campaign_id: &str,
        triggers: &[TriggerPayload],
    ) -> RepositoryResult<()>;
}
