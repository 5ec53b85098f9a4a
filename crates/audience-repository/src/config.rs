//! Repository configuration types
//!
//! Selects where catalog definitions and persisted conditions come from
//! (file system, HTTP API or memory) and which project they belong to.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Project key used when none is configured
pub const DEFAULT_PROJECT: &str = "default";

/// Repository source type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositorySource {
    /// Load from file system
    FileSystem,
    /// Load from HTTP API
    Api,
    /// In-memory content (tests, demos, or content added at runtime)
    #[default]
    Memory,
}

/// Repository configuration
///
/// # Examples
///
/// ```rust
/// use audience_repository::RepositoryConfig;
///
/// // File system repository
/// let config = RepositoryConfig::file_system("catalog");
///
/// // API repository
/// let config = RepositoryConfig::api("https://api.example.com/audience")
///     .with_api_key("secret-key")
///     .with_project("shop");
///
/// // Memory repository (for testing)
/// let config = RepositoryConfig::memory();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Configuration source type
    #[serde(default)]
    pub source: RepositorySource,

    /// Project whose definitions are loaded
    #[serde(default = "default_project")]
    pub project: String,

    /// File system base path (required for FileSystem source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    /// API base URL (required for Api source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// API key for authentication (optional for Api source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_project() -> String {
    DEFAULT_PROJECT.to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self::memory()
    }
}

impl RepositoryConfig {
    /// Create a file system repository configuration
    pub fn file_system(path: impl Into<String>) -> Self {
        Self {
            source: RepositorySource::FileSystem,
            project: default_project(),
            base_path: Some(path.into()),
            api_url: None,
            api_key: None,
        }
    }

    /// Create an API repository configuration
    pub fn api(url: impl Into<String>) -> Self {
        Self {
            source: RepositorySource::Api,
            project: default_project(),
            base_path: None,
            api_url: Some(url.into()),
            api_key: None,
        }
    }

    /// Create a memory repository configuration
    pub fn memory() -> Self {
        Self {
            source: RepositorySource::Memory,
            project: default_project(),
            base_path: None,
            api_url: None,
            api_key: None,
        }
    }

    /// Set API key for authentication
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the project key
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Validate the configuration
    ///
    /// Returns an error if required fields are missing for the selected source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project.trim().is_empty() {
            return Err(ConfigError::EmptyProject);
        }

        match self.source {
            RepositorySource::FileSystem if self.base_path.is_none() => {
                Err(ConfigError::MissingField {
                    backend: "FileSystem".to_string(),
                    field: "base_path".to_string(),
                })
            }
            RepositorySource::Api if self.api_url.is_none() => Err(ConfigError::MissingField {
                backend: "Api".to_string(),
                field: "api_url".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

/// Configuration error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required field is missing for the selected source
    #[error("{backend} source requires {field} to be set")]
    MissingField { backend: String, field: String },

    /// The project key is blank
    #[error("project must not be empty")]
    EmptyProject,
}
