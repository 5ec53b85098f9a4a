//! Catalog loading and backend selection
//!
//! [`CatalogLoader`] turns a [`CatalogSource`] into scoped
//! [`CatalogSnapshot`]s. Loading is fail-soft: when the source cannot be
//! reached the loader logs a warning and hands back an unavailable snapshot,
//! so an editor can keep running with its field pickers disabled.

use audience_core::{CatalogScope, CatalogSnapshot};
use std::sync::Arc;

use crate::config::{RepositoryConfig, RepositorySource};
use crate::error::{RepositoryError, RepositoryResult};
use crate::file_system::{FileSystemCatalogSource, FileSystemConditionStore};
use crate::memory::{MemoryCatalogSource, MemoryConditionStore};
use crate::traits::{CatalogSource, ConditionStore};

/// Loads catalog snapshots for one project
///
/// # Example
///
/// ```rust,ignore
/// use audience_core::CatalogScope;
/// use audience_repository::{CatalogLoader, RepositoryConfig};
///
/// let loader = CatalogLoader::from_config(&RepositoryConfig::file_system("catalog"))?;
/// let snapshot = loader.load(&CatalogScope::event("purchase")).await;
/// ```
#[derive(Clone)]
pub struct CatalogLoader {
    source: Arc<dyn CatalogSource>,
    project: String,
}

impl CatalogLoader {
    /// Create a loader over an existing source
    pub fn new(source: Arc<dyn CatalogSource>, project: impl Into<String>) -> Self {
        Self {
            source,
            project: project.into(),
        }
    }

    /// Create a loader whose source is selected by `config`
    pub fn from_config(config: &RepositoryConfig) -> RepositoryResult<Self> {
        config
            .validate()
            .map_err(|e| RepositoryError::Config(e.to_string()))?;

        let source: Arc<dyn CatalogSource> = match config.source {
            RepositorySource::FileSystem => Arc::new(FileSystemCatalogSource::new(
                config.base_path.as_deref().unwrap_or_default(),
            )?),
            RepositorySource::Api => api_catalog_source(config)?,
            RepositorySource::Memory => Arc::new(MemoryCatalogSource::new()),
        };

        Ok(Self::new(source, config.project.clone()))
    }

    /// Project whose definitions are loaded
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Load a snapshot, propagating source failures
    pub async fn try_load(&self, scope: &CatalogScope) -> RepositoryResult<CatalogSnapshot> {
        let definitions = self.source.fetch_definitions(&self.project).await?;
        let snapshot = CatalogSnapshot::from_definitions(scope.clone(), &definitions);
        tracing::debug!(
            "Loaded {} attributes for project '{}' ({})",
            snapshot.len(),
            self.project,
            scope
        );
        Ok(snapshot)
    }

    /// Load a snapshot; failures yield an unavailable snapshot
    pub async fn load(&self, scope: &CatalogScope) -> CatalogSnapshot {
        match self.try_load(scope).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(
                    "Catalog unavailable for project '{}' ({}): {}",
                    self.project,
                    scope,
                    e
                );
                CatalogSnapshot::unavailable(scope.clone())
            }
        }
    }
}

/// Open the condition store selected by `config`
pub fn open_condition_store(config: &RepositoryConfig) -> RepositoryResult<Arc<dyn ConditionStore>> {
    config
        .validate()
        .map_err(|e| RepositoryError::Config(e.to_string()))?;

    match config.source {
        RepositorySource::FileSystem => Ok(Arc::new(FileSystemConditionStore::new(
            config.base_path.as_deref().unwrap_or_default(),
        )?)),
        RepositorySource::Api => api_condition_store(config),
        RepositorySource::Memory => Ok(Arc::new(MemoryConditionStore::new())),
    }
}

#[cfg(feature = "api")]
fn api_catalog_source(config: &RepositoryConfig) -> RepositoryResult<Arc<dyn CatalogSource>> {
    Ok(Arc::new(crate::api::ApiCatalogSource::new(
        config.api_url.clone().unwrap_or_default(),
        config.api_key.clone(),
    )?))
}

#[cfg(not(feature = "api"))]
fn api_catalog_source(_config: &RepositoryConfig) -> RepositoryResult<Arc<dyn CatalogSource>> {
    Err(RepositoryError::Config(
        "API source requires the 'api' feature".to_string(),
    ))
}

#[cfg(feature = "api")]
fn api_condition_store(config: &RepositoryConfig) -> RepositoryResult<Arc<dyn ConditionStore>> {
    Ok(Arc::new(crate::api::ApiConditionStore::new(
        config.api_url.clone().unwrap_or_default(),
        config.api_key.clone(),
    )?))
}

#[cfg(not(feature = "api"))]
fn api_condition_store(_config: &RepositoryConfig) -> RepositoryResult<Arc<dyn ConditionStore>> {
    Err(RepositoryError::Config(
        "API source requires the 'api' feature".to_string(),
    ))
}
