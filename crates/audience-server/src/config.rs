//! Server configuration

use audience_core::AttributeDefinitions;
use audience_repository::{CatalogLoader, MemoryCatalogSource, RepositoryConfig, RepositorySource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Definitions served by the in-memory catalog source
const SAMPLE_DEFINITIONS: &str = include_str!("../catalog/default.json");

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Where attribute definitions are loaded from
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Accept field addresses the catalog does not know
    #[serde(default)]
    pub allow_unknown_fields: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            repository: RepositoryConfig::default(),
            allow_unknown_fields: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the optional `config/server` file and
    /// `AUDIENCE_*` environment variables
    ///
    /// Nested keys use a double underscore, e.g.
    /// `AUDIENCE_REPOSITORY__SOURCE=filesystem`.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config_result = config::Config::builder()
            .add_source(config::File::with_name("config/server").required(false))
            .add_source(
                config::Environment::with_prefix("AUDIENCE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build();

        match config_result {
            Ok(cfg) => Self::from_config(cfg),
            Err(e) => {
                tracing::info!("No usable configuration source ({}), using defaults", e);
                Ok(Self::default())
            }
        }
    }

    /// Deserialize and validate an already assembled configuration
    pub fn from_config(cfg: config::Config) -> anyhow::Result<Self> {
        let server: Self = cfg
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize config: {}", e))?;
        server
            .repository
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid repository config: {}", e))?;
        Ok(server)
    }

    /// Catalog loader for the configured repository.
    ///
    /// The in-memory source is seeded with the bundled sample definitions
    /// under the configured project.
    pub fn catalog_loader(&self) -> anyhow::Result<CatalogLoader> {
        match self.repository.source {
            RepositorySource::Memory => {
                let definitions: AttributeDefinitions = serde_json::from_str(SAMPLE_DEFINITIONS)
                    .map_err(|e| anyhow::anyhow!("Invalid sample definitions: {}", e))?;
                let source = MemoryCatalogSource::new()
                    .with_project(self.repository.project.clone(), definitions);
                Ok(CatalogLoader::new(Arc::new(source), self.repository.project.clone()))
            }
            _ => Ok(CatalogLoader::from_config(&self.repository)?),
        }
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audience_repository::RepositorySource;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.repository.source, RepositorySource::Memory);
        assert!(!config.allow_unknown_fields);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let cfg = config::Config::builder().build().unwrap();
        let config = ServerConfig::from_config(cfg).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.repository.project, "default");
    }

    #[test]
    fn test_from_toml() {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(
                r#"
                port = 9090

                [repository]
                source = "filesystem"
                base_path = "catalog"
                project = "shop"
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let config = ServerConfig::from_config(cfg).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.repository.source, RepositorySource::FileSystem);
        assert_eq!(config.repository.base_path.as_deref(), Some("catalog"));
        assert_eq!(config.repository.project, "shop");
    }

    #[tokio::test]
    async fn test_default_catalog_is_available() {
        let loader = ServerConfig::default().catalog_loader().unwrap();
        let snapshot = loader.load(&audience_core::CatalogScope::Global).await;

        assert!(snapshot.is_available());
        assert!(snapshot.contains("attributes.plan"));
        assert!(snapshot.contains("events.purchase.attributes.amount"));
    }

    #[test]
    fn test_invalid_repository_rejected() {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(
                "[repository]\nsource = \"api\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        assert!(ServerConfig::from_config(cfg).is_err());
    }
}
