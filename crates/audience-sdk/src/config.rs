//! Configuration types for editing sessions

use crate::error::{Result, SdkError};
use audience_repository::{CatalogLoader, CatalogSource, DEFAULT_PROJECT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// SDK configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkConfig {
    /// Project whose catalog backs the sessions
    #[serde(default = "default_project")]
    pub project: String,

    /// Report singleton removals as disabled affordances.
    ///
    /// Removal of the last filter of a group (or the last group) is always a
    /// no-op; with this set, `can_remove_*` also answers `false` for it so an
    /// editor can grey the control out instead of leaving it inert.
    #[serde(default)]
    pub disable_singleton_removal: bool,

    /// Accept field addresses the catalog does not know at submit time
    #[serde(default)]
    pub allow_unknown_fields: bool,
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

impl SdkConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            project: default_project(),
            disable_singleton_removal: false,
            allow_unknown_fields: false,
        }
    }

    /// Set the project key
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Grey out singleton removals instead of leaving them inert
    pub fn with_singleton_removal_disabled(mut self, disabled: bool) -> Self {
        self.disable_singleton_removal = disabled;
        self
    }

    /// Accept unknown field addresses at submit time
    pub fn with_unknown_fields_allowed(mut self, allowed: bool) -> Self {
        self.allow_unknown_fields = allowed;
        self
    }

    /// Check the configuration
    pub fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(SdkError::ConfigError("project must not be empty".to_string()));
        }
        Ok(())
    }

    /// Catalog loader reading this project's definitions from `source`
    pub fn catalog_loader(&self, source: Arc<dyn CatalogSource>) -> Result<CatalogLoader> {
        self.validate()?;
        Ok(CatalogLoader::new(source, self.project.clone()))
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self::new()
    }
}
